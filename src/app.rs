use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::apply;
use crate::commands::Xinput;
use crate::config::{Config, Profile};
use crate::device::{self, Device};

/// Speed is held in centi-units so stepping stays exact; the slider range is
/// ±1.00 normally and ±2.00 in extended mode, as the transform matrix allows
/// a wider swing than the accel property.
const SPEED_STEP: i32 = 5;
const SPEED_LIMIT: i32 = 100;
const EXTENDED_SPEED_LIMIT: i32 = 200;

/// Saved profiles are re-applied once shortly after startup, so a session
/// autostart does not race the pointer driver's own initialization.
const AUTO_APPLY_DELAY: Duration = Duration::from_secs(1);

pub const OPTION_COUNT: usize = 7;

const SPEED_IDX: usize = 0;
const EXTENDED_IDX: usize = 1;
const SAVE_BY_ID_IDX: usize = 2;
const SHOW_WHITELIST_IDX: usize = 3;
const APPLY_ALL_IDX: usize = 4;
const REFRESH_IDX: usize = 5;
const EDIT_WHITELIST_IDX: usize = 6;

#[derive(PartialEq)]
pub enum FocusedPane {
    Devices,
    Options,
}

#[derive(PartialEq)]
pub enum Mode {
    Normal,
    Whitelist,
}

pub struct App {
    backend: Xinput,
    pub config: Config,
    config_path: PathBuf,
    pub all_devices: Vec<Device>,
    pub devices: Vec<Device>,
    pub device_list_state: ListState,
    pub option_list_state: ListState,
    pub whitelist_list_state: ListState,
    pub focused_pane: FocusedPane,
    pub mode: Mode,
    pub speed: i32,
    pub extended: bool,
    pub save_by_id: bool,
    pub info_message: Option<String>,
    started: Instant,
    auto_applied: bool,
}

impl App {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        let mut app = Self {
            backend: Xinput,
            config,
            config_path,
            all_devices: Vec::new(),
            devices: Vec::new(),
            device_list_state: ListState::default(),
            option_list_state: Self::init_list_state(OPTION_COUNT),
            whitelist_list_state: ListState::default(),
            focused_pane: FocusedPane::Devices,
            mode: Mode::Normal,
            speed: 0,
            extended: false,
            save_by_id: false,
            info_message: None,
            started: Instant::now(),
            auto_applied: false,
        };
        app.refresh_devices();
        app
    }

    fn init_list_state(count: usize) -> ListState {
        let mut state = ListState::default();
        if count > 0 {
            state.select(Some(0));
        }
        state
    }

    /// Rescan pointers and recompute the visible list.
    pub fn refresh_devices(&mut self) {
        self.all_devices = device::scan(&self.backend);
        if self.all_devices.is_empty() {
            self.info_message =
                Some("Could not obtain the device list. Is xinput available?".into());
        }
        self.compute_visible();
    }

    fn compute_visible(&mut self) {
        self.devices = device::visible(
            &self.all_devices,
            &self.config.whitelist_set(),
            self.config.show_only_whitelist,
        );
        self.device_list_state = Self::init_list_state(self.devices.len());
        self.option_list_state.select(Some(0));
        self.sync_selection();
    }

    /// Load the selected device's resolved profile into the controls and
    /// apply it right away for instant feedback.
    fn sync_selection(&mut self) {
        let Some(device) = self.selected_device().cloned() else {
            return;
        };
        let profile = self
            .config
            .profile_for(&device.name, Some(&device.id))
            .unwrap_or_default();

        self.extended = profile.extended;
        self.speed = (profile.speed * 100.0).round() as i32;
        self.save_by_id = self.config.by_id.contains_key(&device.id);

        apply::apply_to_device(&self.backend, &device.id, profile.speed, profile.extended);
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.device_list_state
            .selected()
            .and_then(|idx| self.devices.get(idx))
    }

    pub fn speed_as_float(&self) -> f64 {
        self.speed as f64 / 100.0
    }

    fn speed_limit(&self) -> i32 {
        if self.extended {
            EXTENDED_SPEED_LIMIT
        } else {
            SPEED_LIMIT
        }
    }

    fn cycle_selection(current: Option<usize>, max: usize, forward: bool) -> Option<usize> {
        if max == 0 {
            return None;
        }
        Some(match current {
            Some(i) if forward => (i + 1) % max,
            Some(i) => (i + max - 1) % max,
            None => 0,
        })
    }

    fn navigate_devices(&mut self, forward: bool) {
        let selection = Self::cycle_selection(
            self.device_list_state.selected(),
            self.devices.len(),
            forward,
        );
        self.device_list_state.select(selection);
        self.option_list_state.select(Some(0));
        self.sync_selection();
    }

    fn navigate_options(&mut self, forward: bool) {
        let selection =
            Self::cycle_selection(self.option_list_state.selected(), OPTION_COUNT, forward);
        self.option_list_state.select(selection);
    }

    fn navigate_whitelist(&mut self, forward: bool) {
        let selection = Self::cycle_selection(
            self.whitelist_list_state.selected(),
            self.all_devices.len(),
            forward,
        );
        self.whitelist_list_state.select(selection);
    }

    fn modify_selected_option(&mut self, increase: bool) {
        match self.option_list_state.selected() {
            Some(SPEED_IDX) => self.adjust_speed(increase),
            Some(EXTENDED_IDX) => self.toggle_extended(),
            Some(SAVE_BY_ID_IDX) => self.save_by_id = !self.save_by_id,
            Some(SHOW_WHITELIST_IDX) => self.toggle_show_only_whitelist(),
            _ => {}
        }
    }

    fn adjust_speed(&mut self, increase: bool) {
        if self.selected_device().is_none() {
            return;
        }
        let limit = self.speed_limit();
        let delta = if increase { SPEED_STEP } else { -SPEED_STEP };
        self.speed = (self.speed + delta).clamp(-limit, limit);
        self.persist_and_apply();
    }

    fn toggle_extended(&mut self) {
        if self.selected_device().is_none() {
            return;
        }
        self.extended = !self.extended;
        self.speed = rescale_speed(self.speed, self.extended);
        self.persist_and_apply();
    }

    fn toggle_show_only_whitelist(&mut self) {
        self.config.show_only_whitelist = !self.config.show_only_whitelist;
        self.save_config();
        self.refresh_devices();
    }

    /// Write the edited profile into the config, save, and apply live.
    fn persist_and_apply(&mut self) {
        let Some(device) = self.selected_device().cloned() else {
            return;
        };
        let profile = Profile {
            speed: self.speed_as_float(),
            extended: self.extended,
        };

        // Always stored by name; by id only when requested.
        self.config.by_name.insert(device.name.clone(), profile);
        if self.save_by_id {
            self.config.by_id.insert(device.id.clone(), profile);
        }
        self.save_config();

        if self.save_by_id {
            apply::apply_to_device(&self.backend, &device.id, profile.speed, profile.extended);
        } else {
            // A name profile governs every connected device with this name.
            apply::apply_by_name(&self.backend, &self.all_devices, &device.name, profile);
        }
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save(&self.config_path) {
            // The in-memory state stays; the next successful save catches up.
            log::error!("could not save {}: {}", self.config_path.display(), e);
        }
    }

    pub fn apply_all_profiles(&mut self) {
        if self.all_devices.is_empty() {
            self.refresh_devices();
        }
        apply::apply_all(&self.backend, &self.all_devices, &self.config);
    }

    /// Called between input polls; fires the one-shot startup auto-apply.
    pub fn tick(&mut self) {
        if !self.auto_applied && self.started.elapsed() >= AUTO_APPLY_DELAY {
            self.auto_applied = true;
            log::info!("re-applying saved profiles after startup delay");
            self.apply_all_profiles();
        }
    }

    fn enter_whitelist_mode(&mut self) {
        self.mode = Mode::Whitelist;
        self.whitelist_list_state = Self::init_list_state(self.all_devices.len());
    }

    fn toggle_whitelist_entry(&mut self) {
        let Some(device) = self
            .whitelist_list_state
            .selected()
            .and_then(|idx| self.all_devices.get(idx))
            .cloned()
        else {
            return;
        };
        self.config.toggle_whitelist(&device.name, &device.id);
    }

    fn leave_whitelist_mode(&mut self) {
        self.mode = Mode::Normal;
        self.save_config();
        self.refresh_devices();
    }

    fn toggle_pane(&mut self) {
        self.focused_pane = if self.focused_pane == FocusedPane::Devices {
            FocusedPane::Options
        } else {
            FocusedPane::Devices
        };
    }

    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.info_message.is_some() {
            self.info_message = None;
        }

        if self.mode == Mode::Whitelist {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => self.leave_whitelist_mode(),
                KeyCode::Char('j') | KeyCode::Down => self.navigate_whitelist(true),
                KeyCode::Char('k') | KeyCode::Up => self.navigate_whitelist(false),
                KeyCode::Enter | KeyCode::Char(' ') => self.toggle_whitelist_entry(),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.toggle_pane(),
            KeyCode::Char('j') | KeyCode::Down => match self.focused_pane {
                FocusedPane::Devices => self.navigate_devices(true),
                FocusedPane::Options => self.navigate_options(true),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.focused_pane {
                FocusedPane::Devices => self.navigate_devices(false),
                FocusedPane::Options => self.navigate_options(false),
            },
            KeyCode::Char('l') | KeyCode::Right if self.focused_pane == FocusedPane::Options => {
                self.modify_selected_option(true)
            }
            KeyCode::Char('h') | KeyCode::Left if self.focused_pane == FocusedPane::Options => {
                self.modify_selected_option(false)
            }
            KeyCode::Enter if self.focused_pane == FocusedPane::Options => {
                match self.option_list_state.selected() {
                    Some(EXTENDED_IDX) => self.toggle_extended(),
                    Some(SAVE_BY_ID_IDX) => self.save_by_id = !self.save_by_id,
                    Some(SHOW_WHITELIST_IDX) => self.toggle_show_only_whitelist(),
                    Some(APPLY_ALL_IDX) => {
                        self.apply_all_profiles();
                        self.info_message = Some("Saved profiles re-applied".into());
                    }
                    Some(REFRESH_IDX) => self.refresh_devices(),
                    Some(EDIT_WHITELIST_IDX) => self.enter_whitelist_mode(),
                    _ => {}
                }
            }
            _ => {}
        }
        false
    }

    pub fn is_focused(&self, pane: FocusedPane) -> bool {
        self.focused_pane == pane
    }
}

/// Double or halve the centi-speed when switching modes, clamped to the new
/// range, so the applied value keeps roughly the same feel.
fn rescale_speed(speed: i32, extended: bool) -> i32 {
    if extended {
        (speed * 2).clamp(-EXTENDED_SPEED_LIMIT, EXTENDED_SPEED_LIMIT)
    } else {
        (speed / 2).clamp(-SPEED_LIMIT, SPEED_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_selection_wraps_both_ways() {
        assert_eq!(App::cycle_selection(Some(0), 3, true), Some(1));
        assert_eq!(App::cycle_selection(Some(2), 3, true), Some(0));
        assert_eq!(App::cycle_selection(Some(0), 3, false), Some(2));
        assert_eq!(App::cycle_selection(None, 3, true), Some(0));
        assert_eq!(App::cycle_selection(Some(1), 0, true), None);
    }

    #[test]
    fn rescale_doubles_into_extended_and_halves_back() {
        assert_eq!(rescale_speed(50, true), 100);
        assert_eq!(rescale_speed(100, false), 50);
        assert_eq!(rescale_speed(150, true), 200);
        assert_eq!(rescale_speed(-130, true), -200);
        assert_eq!(rescale_speed(0, true), 0);
    }
}
