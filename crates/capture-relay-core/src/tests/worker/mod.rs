mod dispatcher;
mod manager;
mod retry;
