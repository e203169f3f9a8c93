use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{GeoJson, Value};
use serde::Deserialize;

use crate::map::{ChoroplethRenderer, Ring};

/// EPA SIT figure for US per-capita textile waste, kg/person.
/// The EEA table only covers Europe, so the US row is appended here.
pub const US_WASTE_PER_CAPITA_KG: f64 = 40.22;

/// Population assumed when a country is missing from the codes table
const DEFAULT_POPULATION_MILLIONS: f64 = 10.0;

/// Aggregate rows in the EEA table that are not countries
const AGGREGATE_ROWS: [&str; 7] = ["EU27", "EU28", "Europe", "OECD", "EFTA", "EU", "European Union"];

/// Country names whose ISO code is missing or wrong in the codes table
const MANUAL_ISO: [(&str, &str); 3] = [
    ("United States", "USA"),
    ("Turkey", "TUR"),
    ("Czechia", "CZE"),
];

/// Approximate country centroids, used to frame the initial viewport
/// and as symbol anchors when no polygon data is available.
const CENTROIDS: [(&str, f64, f64); 32] = [
    ("AUT", 14.6, 47.6),
    ("BEL", 4.6, 50.6),
    ("BGR", 25.5, 42.8),
    ("HRV", 15.2, 45.1),
    ("CYP", 33.4, 35.1),
    ("CZE", 15.3, 49.8),
    ("DNK", 9.5, 56.0),
    ("EST", 25.0, 58.6),
    ("FIN", 26.0, 64.5),
    ("FRA", 2.2, 46.2),
    ("DEU", 10.4, 51.1),
    ("GRC", 22.0, 39.0),
    ("HUN", 19.4, 47.2),
    ("ISL", -18.6, 64.9),
    ("IRL", -8.0, 53.4),
    ("ITA", 12.6, 42.5),
    ("LVA", 24.6, 56.9),
    ("LTU", 23.9, 55.2),
    ("LUX", 6.1, 49.8),
    ("MLT", 14.4, 35.9),
    ("NLD", 5.3, 52.1),
    ("NOR", 9.0, 61.0),
    ("POL", 19.4, 52.1),
    ("PRT", -8.2, 39.6),
    ("ROU", 25.0, 45.9),
    ("SVK", 19.7, 48.7),
    ("SVN", 14.8, 46.1),
    ("ESP", -3.6, 40.3),
    ("SWE", 16.3, 62.8),
    ("TUR", 35.2, 38.9),
    ("GBR", -2.9, 54.0),
    ("USA", -98.6, 39.8),
];

/// One country of the joined waste/ISO/population table.
/// `population` is in persons and is only ever mutated through the
/// sidebar editor.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryRecord {
    pub country: String,
    pub iso3: String,
    pub waste_kg_per_capita: f64,
    pub population: u64,
}

impl CountryRecord {
    pub fn population_millions(&self) -> f64 {
        self.population as f64 / 1e6
    }
}

#[derive(Deserialize)]
struct WasteRow {
    country: String,
    waste_kg_per_capita: f64,
}

#[derive(Deserialize)]
struct CodeRow {
    country: String,
    iso3: String,
    population_millions: f64,
}

/// Load and join the waste and country-code tables into CountryRecords,
/// sorted by country name. Malformed and unmatched rows are dropped.
pub fn load_dataset(data_dir: &Path) -> Result<Vec<CountryRecord>> {
    let waste_path = data_dir.join("eea_waste_per_capita.csv");
    let codes_path = data_dir.join("country_codes.csv");

    let waste = load_waste_table(&waste_path)
        .with_context(|| format!("reading waste table {}", waste_path.display()))?;
    let codes = load_codes_table(&codes_path)
        .with_context(|| format!("reading country codes {}", codes_path.display()))?;

    Ok(join_tables(waste, &codes))
}

/// Read the EEA per-capita table: drop aggregate rows, normalize the
/// Türkiye spelling, append the hard-coded United States row.
fn load_waste_table(path: &Path) -> Result<Vec<(String, f64)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows: Vec<(String, f64)> = Vec::new();

    for result in reader.deserialize::<WasteRow>() {
        // Malformed rows are dropped, not fatal
        let Ok(row) = result else { continue };
        if AGGREGATE_ROWS.contains(&row.country.as_str()) {
            continue;
        }
        if row.waste_kg_per_capita < 0.0 {
            continue;
        }
        let country = if row.country == "Türkiye" {
            "Turkey".to_string()
        } else {
            row.country
        };
        rows.push((country, row.waste_kg_per_capita));
    }

    if !rows.iter().any(|(c, _)| c == "United States") {
        rows.push(("United States".to_string(), US_WASTE_PER_CAPITA_KG));
    }

    Ok(rows)
}

/// Read the static ISO-3 / population table keyed by country name
fn load_codes_table(path: &Path) -> Result<HashMap<String, (String, f64)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut codes = HashMap::new();

    for result in reader.deserialize::<CodeRow>() {
        let Ok(row) = result else { continue };
        codes.insert(row.country, (row.iso3, row.population_millions));
    }

    Ok(codes)
}

/// Merge the two tables on country name. Countries whose ISO code
/// cannot be resolved are dropped so every displayed country maps
/// onto the choropleth.
fn join_tables(
    waste: Vec<(String, f64)>,
    codes: &HashMap<String, (String, f64)>,
) -> Vec<CountryRecord> {
    let manual: HashMap<&str, &str> = MANUAL_ISO.iter().cloned().collect();
    let mut records: Vec<CountryRecord> = Vec::with_capacity(waste.len());

    for (country, waste_kg_per_capita) in waste {
        let (iso3, population_millions) = match codes.get(&country) {
            Some((iso, pop)) => (iso.clone(), *pop),
            None => match manual.get(country.as_str()) {
                Some(iso) => (iso.to_string(), DEFAULT_POPULATION_MILLIONS),
                None => continue, // unresolvable ISO code: drop
            },
        };

        let population_millions = if population_millions > 0.0 {
            population_millions
        } else {
            DEFAULT_POPULATION_MILLIONS
        };

        records.push(CountryRecord {
            country,
            iso3,
            waste_kg_per_capita,
            population: (population_millions * 1e6).round() as u64,
        });
    }

    records.sort_by(|a, b| a.country.cmp(&b.country));
    records
}

/// Load country polygons from a Natural Earth admin-0 GeoJSON file
/// into the renderer. Keyed by the ISO_A3 (or ADM0_A3) property.
pub fn load_country_shapes(renderer: &mut ChoroplethRenderer, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;

    let GeoJson::FeatureCollection(fc) = geojson else {
        anyhow::bail!("expected a FeatureCollection");
    };

    for feature in fc.features {
        let iso3 = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("ISO_A3").or_else(|| p.get("ADM0_A3")))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let (Some(iso3), Some(geometry)) = (iso3, feature.geometry) else {
            continue;
        };

        let polygons = match geometry.value {
            Value::Polygon(rings) => vec![to_rings(&rings)],
            Value::MultiPolygon(polys) => polys.iter().map(|rings| to_rings(rings)).collect(),
            _ => continue,
        };

        renderer.add_country(&iso3, polygons);
    }

    Ok(())
}

fn to_rings(rings: &[Vec<Vec<f64>>]) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|c| (c[0], c[1])).collect())
        .collect()
}

/// Seed the renderer with embedded country centroids so the map works
/// without any GeoJSON file on disk.
pub fn seed_centroids(renderer: &mut ChoroplethRenderer) {
    for (iso3, lon, lat) in CENTROIDS {
        renderer.add_centroid(iso3, lon, lat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tables(dir: &Path, waste: &str, codes: &str) {
        let mut f = fs::File::create(dir.join("eea_waste_per_capita.csv")).unwrap();
        f.write_all(waste.as_bytes()).unwrap();
        let mut f = fs::File::create(dir.join("country_codes.csv")).unwrap();
        f.write_all(codes.as_bytes()).unwrap();
    }

    #[test]
    fn test_join_drops_aggregates_and_unmatched() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "country,waste_kg_per_capita\n\
             EU27,12.0\n\
             France,11.4\n\
             Atlantis,99.0\n",
            "country,iso3,population_millions\n\
             France,FRA,67\n",
        );

        let records = load_dataset(dir.path()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, ["France", "United States"]);
    }

    #[test]
    fn test_us_row_appended_with_constant() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "country,waste_kg_per_capita\nFrance,11.4\n",
            "country,iso3,population_millions\nFrance,FRA,67\n",
        );

        let records = load_dataset(dir.path()).unwrap();
        let us = records.iter().find(|r| r.country == "United States").unwrap();
        assert_eq!(us.iso3, "USA");
        assert_eq!(us.waste_kg_per_capita, US_WASTE_PER_CAPITA_KG);
        // No codes row: falls back to the default population
        assert_eq!(us.population, 10_000_000);
    }

    #[test]
    fn test_turkiye_normalized_and_manual_iso() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "country,waste_kg_per_capita\nTürkiye,8.3\n",
            "country,iso3,population_millions\nSomewhere,XYZ,1\n",
        );

        let records = load_dataset(dir.path()).unwrap();
        let turkey = records.iter().find(|r| r.country == "Turkey").unwrap();
        assert_eq!(turkey.iso3, "TUR");
    }

    #[test]
    fn test_malformed_rows_dropped_silently() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "country,waste_kg_per_capita\n\
             France,11.4\n\
             Germany,not-a-number\n\
             Norway,-3.0\n",
            "country,iso3,population_millions\n\
             France,FRA,67\n\
             Germany,DEU,83\n\
             Norway,NOR,5.4\n\
             United States,USA,327\n",
        );

        let records = load_dataset(dir.path()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, ["France", "United States"]);
    }

    #[test]
    fn test_missing_waste_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dataset(dir.path()).is_err());
    }

    #[test]
    fn test_population_from_codes_table() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            "country,waste_kg_per_capita\nFrance,11.4\n",
            "country,iso3,population_millions\n\
             France,FRA,67\n\
             United States,USA,327\n",
        );

        let records = load_dataset(dir.path()).unwrap();
        let france = records.iter().find(|r| r.country == "France").unwrap();
        assert_eq!(france.population, 67_000_000);
        assert!((france.population_millions() - 67.0).abs() < 1e-9);
    }
}
