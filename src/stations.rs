//! Static station reference data and name resolution.
//!
//! Maps free-form station names to geographic positions. The table is
//! immutable for the lifetime of the process and its order is fixed:
//! fuzzy matching returns the first hit in table order, so ambiguous
//! substrings always resolve identically for identical input.

use crate::query::GeoPoint;

/// A station's reference position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationPosition {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// GPS positions of the main French stations.
pub const STATION_POSITIONS: &[StationPosition] = &[
    StationPosition { name: "Paris Montparnasse", lat: 48.8412, lon: 2.3205 },
    StationPosition { name: "Paris Gare de Lyon", lat: 48.8443, lon: 2.3737 },
    StationPosition { name: "Paris Nord", lat: 48.8809, lon: 2.3553 },
    StationPosition { name: "Paris Est", lat: 48.8767, lon: 2.3584 },
    StationPosition { name: "Paris Saint-Lazare", lat: 48.8762, lon: 2.3253 },
    StationPosition { name: "Lyon Part-Dieu", lat: 45.7602, lon: 4.8597 },
    StationPosition { name: "Lyon Perrache", lat: 45.7485, lon: 4.8262 },
    StationPosition { name: "Marseille Saint-Charles", lat: 43.3028, lon: 5.3804 },
    StationPosition { name: "Bordeaux Saint-Jean", lat: 44.8256, lon: -0.5566 },
    StationPosition { name: "Toulouse Matabiau", lat: 43.6112, lon: 1.4537 },
    StationPosition { name: "Nantes", lat: 47.2173, lon: -1.5418 },
    StationPosition { name: "Rennes", lat: 48.1035, lon: -1.6726 },
    StationPosition { name: "Lille Flandres", lat: 50.6365, lon: 3.0698 },
    StationPosition { name: "Lille Europe", lat: 50.6388, lon: 3.0754 },
    StationPosition { name: "Strasbourg", lat: 48.5850, lon: 7.7350 },
    StationPosition { name: "Nice Ville", lat: 43.7049, lon: 7.2620 },
    StationPosition { name: "Montpellier Saint-Roch", lat: 43.6047, lon: 3.8808 },
    StationPosition { name: "Biarritz", lat: 43.4682, lon: -1.5490 },
    StationPosition { name: "Bayonne", lat: 43.4929, lon: -1.4748 },
    StationPosition { name: "Dax", lat: 43.7102, lon: -1.0537 },
    StationPosition { name: "Avignon TGV", lat: 43.9217, lon: 4.7863 },
    StationPosition { name: "Aix-en-Provence TGV", lat: 43.4553, lon: 5.3173 },
    StationPosition { name: "Massy TGV", lat: 48.7253, lon: 2.2608 },
    StationPosition { name: "Le Mans", lat: 47.9954, lon: 0.1921 },
    StationPosition { name: "Poitiers", lat: 46.5827, lon: 0.3333 },
    StationPosition { name: "Angoulême", lat: 45.6500, lon: 0.1557 },
    StationPosition { name: "Tours", lat: 47.3900, lon: 0.6933 },
    StationPosition { name: "Saint-Pierre-des-Corps", lat: 47.3858, lon: 0.7256 },
    StationPosition { name: "Marne-la-Vallée Chessy", lat: 48.8722, lon: 2.7767 },
    StationPosition { name: "Lyon Saint-Exupéry TGV", lat: 45.7219, lon: 5.0778 },
    StationPosition { name: "Valence TGV", lat: 44.9785, lon: 4.9697 },
    StationPosition { name: "Grenoble", lat: 45.1915, lon: 5.7148 },
    StationPosition { name: "Annecy", lat: 45.9023, lon: 6.1211 },
    StationPosition { name: "Dijon Ville", lat: 47.3234, lon: 5.0271 },
    StationPosition { name: "Besançon Franche-Comté TGV", lat: 47.3075, lon: 5.9563 },
    StationPosition { name: "Mulhouse Ville", lat: 47.7426, lon: 7.3426 },
    StationPosition { name: "Reims", lat: 49.2583, lon: 4.0243 },
    StationPosition { name: "Orléans", lat: 47.9089, lon: 1.9052 },
    StationPosition { name: "Le Havre", lat: 49.4944, lon: 0.1226 },
    StationPosition { name: "Rouen Rive Droite", lat: 49.4489, lon: 1.0937 },
    StationPosition { name: "Caen", lat: 49.1782, lon: -0.3469 },
    StationPosition { name: "Brest", lat: 48.3878, lon: -4.4803 },
    StationPosition { name: "Quimper", lat: 47.9975, lon: -4.0963 },
    StationPosition { name: "Lorient", lat: 47.7457, lon: -3.3653 },
    StationPosition { name: "Vannes", lat: 47.6586, lon: -2.7583 },
    StationPosition { name: "Saint-Brieuc", lat: 48.5156, lon: -2.7606 },
    StationPosition { name: "Saint-Malo", lat: 48.6481, lon: -2.0082 },
    StationPosition { name: "La Rochelle Ville", lat: 46.1528, lon: -1.1476 },
    StationPosition { name: "Perpignan", lat: 42.6977, lon: 2.8797 },
    StationPosition { name: "Nîmes", lat: 43.8328, lon: 4.3653 },
    StationPosition { name: "Clermont-Ferrand", lat: 45.7792, lon: 3.0997 },
    StationPosition { name: "Limoges Bénédictins", lat: 45.8363, lon: 1.2679 },
];

/// Resolve a free-form station name to a position.
///
/// Tries an exact, case-sensitive lookup first, then a case-insensitive
/// substring match in both directions (table name contains the query, or
/// the query contains the table name), returning the first hit in table
/// order. Returns `None` when nothing matches; callers should omit the
/// station rather than fail the whole render.
pub fn resolve(name: &str) -> Option<GeoPoint> {
    if let Some(station) = STATION_POSITIONS.iter().find(|s| s.name == name) {
        return Some(GeoPoint {
            lat: station.lat,
            lon: station.lon,
        });
    }

    let query = name.to_lowercase();
    for station in STATION_POSITIONS {
        let table_name = station.name.to_lowercase();
        if table_name.contains(&query) || query.contains(&table_name) {
            return Some(GeoPoint {
                lat: station.lat,
                lon: station.lon,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_exact_match() {
        let position = resolve("Paris Gare de Lyon").unwrap();
        assert_eq!(position.lat, 48.8443);
        assert_eq!(position.lon, 2.3737);
    }

    #[test]
    fn resolve_substring_match_is_case_insensitive() {
        let position = resolve("gare de lyon").unwrap();
        assert_eq!(position.lat, 48.8443);
        assert_eq!(position.lon, 2.3737);
    }

    #[test]
    fn resolve_query_containing_table_name() {
        // The query is longer than the table entry; containment works both ways.
        let position = resolve("Gare de Rennes").unwrap();
        let rennes = STATION_POSITIONS
            .iter()
            .find(|s| s.name == "Rennes")
            .unwrap();
        assert_eq!(position.lat, rennes.lat);
        assert_eq!(position.lon, rennes.lon);
    }

    #[test]
    fn resolve_unknown_station_is_none() {
        assert_eq!(resolve("Nowhereville"), None);
    }

    #[test]
    fn resolve_ambiguous_substring_is_first_in_table_order() {
        // "paris" is contained in five station names; the first table entry wins,
        // and repeatedly so.
        let first = resolve("paris").unwrap();
        let montparnasse = &STATION_POSITIONS[0];
        assert_eq!(first.lat, montparnasse.lat);
        assert_eq!(first.lon, montparnasse.lon);
        assert_eq!(resolve("paris"), Some(first));
    }

    #[test]
    fn resolve_prefers_exact_over_substring() {
        // "Lille Europe" is a substring target for "lille", but the exact
        // name must not fall through to fuzzy matching.
        let position = resolve("Lille Europe").unwrap();
        assert_eq!(position.lat, 50.6388);
        assert_eq!(position.lon, 3.0754);
    }

    #[test]
    fn table_has_unique_names() {
        for (i, a) in STATION_POSITIONS.iter().enumerate() {
            for b in &STATION_POSITIONS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn table_positions_are_plausible_for_france() {
        for station in STATION_POSITIONS {
            assert!(
                (41.0..52.0).contains(&station.lat),
                "{} latitude out of range",
                station.name
            );
            assert!(
                (-5.5..10.0).contains(&station.lon),
                "{} longitude out of range",
                station.name
            );
        }
    }
}
