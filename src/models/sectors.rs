/// Static sector → units mapping used to populate the registration form
/// selects. Participants pick a sector and one of its units.
pub struct Sector {
    pub name: &'static str,
    pub units: &'static [&'static str],
}

pub const SECTORS: &[Sector] = &[
    Sector {
        name: "Kasaragod East",
        units: &["Adhur", "Bovikanam", "Chattanchal", "Mulleria", "Periya"],
    },
    Sector {
        name: "Kasaragod West",
        units: &["Chemnad", "Deli", "Kudlu", "Thalangara", "Vidyanagar"],
    },
    Sector {
        name: "Uduma",
        units: &["Bare", "Koliyadukam", "Pallikkara", "Uduma Town"],
    },
    Sector {
        name: "Chengala",
        units: &["Chengala Town", "Kalanad", "Muttathody", "Neerchal"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sector_has_units_and_unique_names() {
        let mut names: Vec<&str> = SECTORS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SECTORS.len());
        for sector in SECTORS {
            assert!(!sector.units.is_empty(), "{} has no units", sector.name);
        }
    }
}
