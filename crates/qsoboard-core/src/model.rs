//! Contact records and the closed band / mode vocabularies used by aggregation.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};
use chrono::DateTime;
use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// UTC epoch seconds.
pub type Timestamp = i64;

/// One logged contact, as read from the event store. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub timestamp: Timestamp,
    pub callsign: String,
    pub exchange: String,
    pub section: String,
    pub operator: String,
    pub station: String,
    /// Raw band label as logged (e.g. `20m` or `14`).
    pub band: String,
    /// Raw mode as logged (e.g. `CW`, `USB`, `FT8`).
    pub mode: String,
}

impl EventRecord {
    pub fn new(
        timestamp: Timestamp,
        operator: impl Into<String>,
        station: impl Into<String>,
        band: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            callsign: String::new(),
            exchange: String::new(),
            section: String::new(),
            operator: operator.into(),
            station: station.into(),
            band: band.into(),
            mode: mode.into(),
        }
    }

    /// Sets the worked station's call, exchange and section.
    #[must_use]
    pub fn with_contact(
        mut self,
        callsign: impl Into<String>,
        exchange: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        self.callsign = callsign.into();
        self.exchange = exchange.into();
        self.section = section.into();
        self
    }

    /// Ticker banner describing this contact.
    pub fn banner(&self) -> String {
        let band = match Band::from_label(&self.band) {
            Some(band) => band.label(),
            None => self.band.as_str(),
        };
        let time = DateTime::from_timestamp(self.timestamp, 0)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        format!(
            "Last QSO: {} {} {} on {} by {} at {}",
            self.callsign, self.exchange, self.section, band, self.operator, time
        )
    }
}

/// Contest bands, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum)]
pub enum Band {
    M160,
    M80,
    M40,
    M20,
    M15,
    M10,
    M6,
    M2,
    Cm70,
}

impl Band {
    pub const ALL: [Band; 9] = [
        Band::M160,
        Band::M80,
        Band::M40,
        Band::M20,
        Band::M15,
        Band::M10,
        Band::M6,
        Band::M2,
        Band::Cm70,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Band::M160 => "160m",
            Band::M80 => "80m",
            Band::M40 => "40m",
            Band::M20 => "20m",
            Band::M15 => "15m",
            Band::M10 => "10m",
            Band::M6 => "6m",
            Band::M2 => "2m",
            Band::Cm70 => "70cm",
        }
    }

    /// Logging programs often record the band as its lower edge in MHz.
    fn mhz_alias(self) -> &'static str {
        match self {
            Band::M160 => "1.8",
            Band::M80 => "3.5",
            Band::M40 => "7",
            Band::M20 => "14",
            Band::M15 => "21",
            Band::M10 => "28",
            Band::M6 => "50",
            Band::M2 => "144",
            Band::Cm70 => "420",
        }
    }

    /// Parses a band label or MHz alias. Unknown values yield `None`.
    pub fn from_label(label: &str) -> Option<Band> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|band| band.label().eq_ignore_ascii_case(label) || band.mhz_alias() == label)
    }

    /// Checks that every label and alias maps back to exactly one band.
    ///
    /// # Errors
    /// Returns an error naming the first ambiguous label.
    pub fn validate_labels() -> Result<()> {
        let mut seen: HashMap<String, Band> = HashMap::new();
        for band in Self::ALL {
            for key in [band.label().to_ascii_lowercase(), band.mhz_alias().to_string()] {
                if let Some(previous) = seen.insert(key.clone(), band) {
                    bail!("band label '{key}' maps to both {previous:?} and {band:?}");
                }
                if Band::from_label(&key) != Some(band) {
                    bail!("band label '{key}' does not parse back to {band:?}");
                }
            }
        }
        Ok(())
    }
}

/// Coarse mode classes shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeClass {
    Cw,
    Phone,
    Data,
}

impl ModeClass {
    pub const ALL: [ModeClass; 3] = [ModeClass::Cw, ModeClass::Phone, ModeClass::Data];

    pub fn label(self) -> &'static str {
        match self {
            ModeClass::Cw => "CW",
            ModeClass::Phone => "Phone",
            ModeClass::Data => "Data",
        }
    }
}

/// Lookup from raw logged modes to [`ModeClass`]. Keys are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTable {
    classes: BTreeMap<String, ModeClass>,
}

impl ModeTable {
    /// Builds a table, rejecting empty keys and keys that collide once
    /// case is ignored.
    ///
    /// # Errors
    /// Returns an error describing the offending key.
    pub fn new<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, ModeClass)>,
    {
        let mut classes = BTreeMap::new();
        for (raw, class) in entries {
            let key = raw.trim().to_ascii_uppercase();
            if key.is_empty() {
                bail!("mode table contains an empty mode name");
            }
            if classes.insert(key.clone(), class).is_some() {
                bail!("mode '{key}' appears more than once in the mode table");
            }
        }
        Ok(Self { classes })
    }

    pub fn classify(&self, raw: &str) -> Option<ModeClass> {
        self.classes.get(&raw.trim().to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Modes known to N1MM-style loggers and the class each one counts toward.
pub const DEFAULT_MODES: &[(&str, ModeClass)] = &[
    ("CW", ModeClass::Cw),
    ("SSB", ModeClass::Phone),
    ("USB", ModeClass::Phone),
    ("LSB", ModeClass::Phone),
    ("AM", ModeClass::Phone),
    ("FM", ModeClass::Phone),
    ("PH", ModeClass::Phone),
    ("RTTY", ModeClass::Data),
    ("PSK31", ModeClass::Data),
    ("PSK63", ModeClass::Data),
    ("PSK125", ModeClass::Data),
    ("FT8", ModeClass::Data),
    ("FT4", ModeClass::Data),
    ("JT65", ModeClass::Data),
    ("JT9", ModeClass::Data),
    ("MFSK", ModeClass::Data),
    ("OLIVIA", ModeClass::Data),
    ("DIGI", ModeClass::Data),
    ("DG", ModeClass::Data),
];

impl Default for ModeTable {
    fn default() -> Self {
        let classes = DEFAULT_MODES
            .iter()
            .map(|(raw, class)| ((*raw).to_string(), *class))
            .collect();
        Self { classes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_labels_are_injective() {
        Band::validate_labels().unwrap();
    }

    #[test]
    fn test_band_from_label_accepts_aliases() {
        assert_eq!(Band::from_label("20m"), Some(Band::M20));
        assert_eq!(Band::from_label(" 20M "), Some(Band::M20));
        assert_eq!(Band::from_label("14"), Some(Band::M20));
        assert_eq!(Band::from_label("70cm"), Some(Band::Cm70));
        assert_eq!(Band::from_label("17m"), None);
        assert_eq!(Band::from_label(""), None);
    }

    #[test]
    fn test_mode_table_classifies_case_insensitively() {
        let table = ModeTable::default();
        assert_eq!(table.classify("cw"), Some(ModeClass::Cw));
        assert_eq!(table.classify("USB"), Some(ModeClass::Phone));
        assert_eq!(table.classify("ft8"), Some(ModeClass::Data));
        assert_eq!(table.classify("HELL"), None);
    }

    #[test]
    fn test_mode_table_rejects_case_collisions() {
        let err = ModeTable::new([("cw", ModeClass::Cw), ("CW", ModeClass::Data)]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_mode_table_rejects_empty_key() {
        assert!(ModeTable::new([(" ", ModeClass::Cw)]).is_err());
    }

    #[test]
    fn test_banner_formats_contact() {
        let record = EventRecord::new(3_600 * 14 + 62, "N1KDO", "Station 1", "14", "CW")
            .with_contact("W1AW", "3A", "CT");
        assert_eq!(
            record.banner(),
            "Last QSO: W1AW 3A CT on 20m by N1KDO at 14:01:02"
        );
    }

    #[test]
    fn test_banner_keeps_unknown_band_text() {
        let record =
            EventRecord::new(0, "N1KDO", "Station 1", "Sat", "FM").with_contact("W1AW", "3A", "CT");
        assert_eq!(
            record.banner(),
            "Last QSO: W1AW 3A CT on Sat by N1KDO at 00:00:00"
        );
    }
}
