use std::collections::HashSet;

use crate::commands::InputBackend;

/// A slave pointer device as reported by the short-form listing.
///
/// Ids are assigned by the X server per session and are not stable across
/// reboots; the `(name, id)` pair is the identity used for de-duplication
/// and whitelist membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub id: String,
}

impl Device {
    pub fn key(&self) -> (String, String) {
        (self.name.clone(), self.id.clone())
    }
}

/// Box-drawing characters xinput prefixes device lines with.
const DECORATIONS: &str = "⎡⎣⎜⎟↳⎢⎥";

/// Lowercase markers for pointers we hide: the master pointer itself, the
/// virtual core devices, and the XTEST injection device.
const VIRTUAL_MARKERS: [&str; 3] = ["master pointer", "virtual core", "xtest"];

fn is_virtual_pointer_line(line: &str) -> bool {
    let low = line.to_lowercase();
    VIRTUAL_MARKERS.iter().any(|marker| low.contains(marker))
}

/// Extract name and `id=<digits>` from one listing line. Lines contributing
/// no name or no digits are discarded.
fn parse_device_line(line: &str) -> Option<Device> {
    let clean =
        line.trim_start_matches(|c: char| c.is_whitespace() || DECORATIONS.contains(c));
    let (left, right) = clean.split_once("id=")?;
    let name = left.trim_end();
    let id: String = right.chars().take_while(char::is_ascii_digit).collect();
    if name.is_empty() || id.is_empty() {
        return None;
    }
    Some(Device {
        name: name.to_string(),
        id,
    })
}

/// Parse `xinput list --short` output into slave pointer devices.
///
/// Keeps lines containing the literal token "pointer", drops
/// virtual/master/XTEST entries, de-duplicates by `(name, id)` preserving
/// first-seen order.
pub fn parse_device_list(out: &str) -> Vec<Device> {
    let mut seen = HashSet::new();
    let mut devices = Vec::new();

    for raw in out.lines() {
        let line = raw.trim();
        if !line.contains("pointer") {
            continue;
        }
        if is_virtual_pointer_line(line) {
            continue;
        }
        let Some(device) = parse_device_line(line) else {
            continue;
        };
        if seen.insert(device.key()) {
            devices.push(device);
        }
    }

    devices
}

/// Scan connected slave pointers. A listing failure degrades to an empty
/// list; the caller decides how loudly to warn.
pub fn scan<B: InputBackend>(backend: &B) -> Vec<Device> {
    let devices = backend
        .list_short()
        .map(|out| parse_device_list(&out))
        .unwrap_or_default();
    if devices.is_empty() {
        log::warn!("no pointer devices found; is xinput installed and is this an Xorg session?");
    }
    devices
}

/// Apply the whitelist to the full device set, preserving order.
///
/// The whitelist only takes effect when the toggle is on AND the list is
/// non-empty; an enabled-but-empty whitelist shows everything.
pub fn visible(
    all: &[Device],
    whitelist: &HashSet<(String, String)>,
    show_only_whitelist: bool,
) -> Vec<Device> {
    if show_only_whitelist && !whitelist.is_empty() {
        all.iter()
            .filter(|device| whitelist.contains(&device.key()))
            .cloned()
            .collect()
    } else {
        all.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
⎡ Virtual core pointer                    \tid=2\t[master pointer  (3)]
⎜   ↳ Virtual core XTEST pointer          \tid=4\t[slave  pointer  (2)]
⎜   ↳ Logitech USB Mouse                  \tid=11\t[slave  pointer  (2)]
⎜   ↳ SynPS/2 Synaptics TouchPad          \tid=13\t[slave  pointer  (2)]
⎣ Virtual core keyboard                   \tid=3\t[master keyboard (2)]
    ↳ Virtual core XTEST keyboard         \tid=5\t[slave  keyboard (3)]
    ↳ AT Translated Set 2 keyboard        \tid=12\t[slave  keyboard (3)]
";

    #[test]
    fn parses_name_and_id_from_decorated_line() {
        let line = "⎣ Logitech USB Mouse                   id=11  [slave  pointer  (2)]";
        let device = parse_device_line(line).unwrap();
        assert_eq!(device.name, "Logitech USB Mouse");
        assert_eq!(device.id, "11");
    }

    #[test]
    fn rejects_xtest_pointer_line() {
        let line = "⎡ Virtual core XTEST pointer  id=5  [slave  pointer  (2)]";
        assert!(is_virtual_pointer_line(line));
        assert!(parse_device_list(line).is_empty());
    }

    #[test]
    fn listing_keeps_only_real_slave_pointers() {
        let devices = parse_device_list(LISTING);
        assert_eq!(
            devices,
            vec![
                Device {
                    name: "Logitech USB Mouse".into(),
                    id: "11".into()
                },
                Device {
                    name: "SynPS/2 Synaptics TouchPad".into(),
                    id: "13".into()
                },
            ]
        );
    }

    #[test]
    fn lines_without_id_or_name_are_discarded() {
        assert!(parse_device_line("↳ Nameless pointer device").is_none());
        assert!(parse_device_line("↳ id=7  [slave  pointer  (2)]").is_none());
        assert!(parse_device_line("↳ Odd pointer id=abc").is_none());
    }

    #[test]
    fn id_parsing_stops_at_first_non_digit() {
        let device = parse_device_line("↳ Some pointer\tid=42abc").unwrap();
        assert_eq!(device.id, "42");
    }

    #[test]
    fn duplicate_pairs_are_collapsed_in_order() {
        let out = "\
↳ Mouse A\tid=9\t[slave  pointer  (2)]
↳ Mouse B\tid=10\t[slave  pointer  (2)]
↳ Mouse A\tid=9\t[slave  pointer  (2)]
";
        let devices = parse_device_list(out);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "Mouse A");
        assert_eq!(devices[1].name, "Mouse B");
    }

    #[test]
    fn empty_whitelist_fails_open() {
        let all = parse_device_list(LISTING);
        assert_eq!(visible(&all, &HashSet::new(), true), all);
    }

    #[test]
    fn whitelist_off_shows_everything() {
        let all = parse_device_list(LISTING);
        let whitelist: HashSet<_> =
            [("Logitech USB Mouse".to_string(), "11".to_string())].into();
        assert_eq!(visible(&all, &whitelist, false), all);
    }

    #[test]
    fn whitelist_filters_by_exact_pair_preserving_order() {
        let all = parse_device_list(LISTING);
        let whitelist: HashSet<_> = [
            ("SynPS/2 Synaptics TouchPad".to_string(), "13".to_string()),
            // Name matches a device but the id does not: no match.
            ("Logitech USB Mouse".to_string(), "99".to_string()),
        ]
        .into();
        let shown = visible(&all, &whitelist, true);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "SynPS/2 Synaptics TouchPad");
    }
}
