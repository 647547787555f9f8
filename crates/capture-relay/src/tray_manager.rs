//! System tray icon driven by coordinator status.
//!
//! The icon is the action icon: while idle a left click opens the menu
//! (the popup), otherwise the click is delivered to the app as an
//! unconditional stop. The title next to the icon carries the `REC` badge
//! where the platform shows one.

use crate::{AppError, AppResult};

use capture_relay_core::{IconVariant, IndicatorState, SessionState};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_SIZE: u32 = 32;

/// Menu item ids the app matches menu events against.
#[derive(Debug, Clone)]
pub struct TrayMenuIds {
    /// "Start recording".
    pub start: MenuId,
    /// "Stop recording".
    pub stop: MenuId,
    /// "Open recordings folder".
    pub open_folder: MenuId,
    /// "Exit".
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    start_item: MenuItem,
    stop_item: MenuItem,
    menu_ids: TrayMenuIds,
}

impl TrayManager {
    /// Create the tray icon in its idle presentation.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let start_item = MenuItem::new("Start recording", true, None);
        let stop_item = MenuItem::new("Stop recording", false, None);
        let open_folder_item = MenuItem::new("Open recordings folder", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let menu_ids = TrayMenuIds {
            start: start_item.id().clone(),
            stop: stop_item.id().clone(),
            open_folder: open_folder_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        menu.append_items(&[
            &start_item,
            &stop_item,
            &PredefinedMenuItem::separator(),
            &open_folder_item,
            &exit_item,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let idle = IndicatorState::from(SessionState::Idle);
        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("Capture Relay - Idle")
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(idle.popup_enabled)
            .with_icon(Self::render_icon(idle.icon)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            start_item,
            stop_item,
            menu_ids,
        })
    }

    /// Redraw icon, badge, tooltip and menu availability.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn refresh(&mut self, indicator: IndicatorState, message: &str) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(Self::render_icon(indicator.icon)?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(format!("Capture Relay - {}", message)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let badge = (!indicator.badge_text.is_empty()).then_some(indicator.badge_text);
        self.tray_icon.set_title(badge);
        self.tray_icon
            .set_show_menu_on_left_click(indicator.popup_enabled);

        self.start_item.set_enabled(indicator.popup_enabled);
        self.stop_item.set_enabled(!indicator.popup_enabled);

        Ok(())
    }

    /// Draw the icon for `variant`: a filled disc on a transparent square.
    #[track_caller]
    fn render_icon(variant: IconVariant) -> AppResult<Icon> {
        let color = match variant {
            IconVariant::Idle => Rgba([128, 128, 128, 255]),
            IconVariant::Busy => Rgba([230, 160, 30, 255]),
            IconVariant::Recording => Rgba([220, 40, 40, 255]),
        };

        let image = draw_disc(ICON_SIZE, color);
        let (width, height) = image.dimensions();

        Icon::from_rgba(image.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Menu item ids for event matching.
    pub fn menu_ids(&self) -> &TrayMenuIds {
        &self.menu_ids
    }
}

pub(crate) fn draw_disc(size: u32, color: Rgba<u8>) -> RgbaImage {
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 * 0.4;
    RgbaImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f32 - center, y as f32 - center);
        if dx * dx + dy * dy <= radius * radius {
            color
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
