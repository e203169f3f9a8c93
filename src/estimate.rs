use crate::data::CountryRecord;

/// Vinted 2023 impact factor: kg CO₂e avoided per item resold
pub const CO2E_PER_ITEM_KG: f64 = 1.25;

/// Average weight of a resold garment, kg
pub const AVG_ITEM_WEIGHT_KG: f64 = 0.6;

/// Derived scenario figures for one country. Recomputed from the
/// current widget state on every render pass, never mutated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioResult {
    pub country: String,
    pub iso3: String,
    pub waste_kg_per_capita: f64,
    pub population: u64,
    pub reused_kg_per_person: f64,
    pub avoided_items: f64,
    pub avoided_co2_kt: f64,
}

/// CO₂ avoided in kilotonnes for one country at a given reuse fraction.
/// One resold kg counts as one item at 1.25 kg CO₂e; 1 kt = 1e6 kg.
pub fn avoided_co2_kt(waste_kg_per_capita: f64, reuse_fraction: f64, population: u64) -> f64 {
    waste_kg_per_capita * reuse_fraction * population as f64 * CO2E_PER_ITEM_KG / 1e6
}

/// Evaluate the scenario for every record, sorted descending by
/// avoided CO₂. A pure pass over the input; an empty slice yields an
/// empty table.
pub fn evaluate(records: &[CountryRecord], reuse_fraction: f64) -> Vec<ScenarioResult> {
    let mut results: Vec<ScenarioResult> = records
        .iter()
        .map(|record| {
            let reused_kg_per_person = record.waste_kg_per_capita * reuse_fraction;
            let reused_kg_total = reused_kg_per_person * record.population as f64;
            ScenarioResult {
                country: record.country.clone(),
                iso3: record.iso3.clone(),
                waste_kg_per_capita: record.waste_kg_per_capita,
                population: record.population,
                reused_kg_per_person,
                avoided_items: reused_kg_total / AVG_ITEM_WEIGHT_KG,
                avoided_co2_kt: avoided_co2_kt(
                    record.waste_kg_per_capita,
                    reuse_fraction,
                    record.population,
                ),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.avoided_co2_kt
            .partial_cmp(&a.avoided_co2_kt)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, waste: f64, population: u64) -> CountryRecord {
        CountryRecord {
            country: country.to_string(),
            iso3: country[..3.min(country.len())].to_uppercase(),
            waste_kg_per_capita: waste,
            population,
        }
    }

    #[test]
    fn test_worked_example() {
        // 40.22 kg/person, 25% reuse, 1M people
        let kt = avoided_co2_kt(40.22, 0.25, 1_000_000);
        assert!((kt - 12.56875).abs() < 1e-9);
    }

    #[test]
    fn test_non_negative() {
        for waste in [0.0, 0.5, 40.22] {
            for pop in [0u64, 1, 83_000_000] {
                for fraction in [0.10, 0.25, 0.50] {
                    assert!(avoided_co2_kt(waste, fraction, pop) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_linear_in_population_and_fraction() {
        let base = avoided_co2_kt(11.4, 0.25, 10_000_000);
        assert!((avoided_co2_kt(11.4, 0.25, 20_000_000) - 2.0 * base).abs() < 1e-9);
        assert!((avoided_co2_kt(11.4, 0.50, 10_000_000) - 2.0 * base).abs() < 1e-9);
    }

    #[test]
    fn test_zero_population_guard() {
        let results = evaluate(&[record("Nowhere", 12.0, 0)], 0.25);
        assert_eq!(results[0].avoided_co2_kt, 0.0);
        assert_eq!(results[0].avoided_items, 0.0);
    }

    #[test]
    fn test_empty_selection_yields_empty_table() {
        assert!(evaluate(&[], 0.25).is_empty());
    }

    #[test]
    fn test_sorted_descending() {
        let results = evaluate(
            &[
                record("Small", 10.0, 1_000_000),
                record("Large", 10.0, 50_000_000),
                record("Medium", 10.0, 5_000_000),
            ],
            0.25,
        );
        let order: Vec<&str> = results.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(order, ["Large", "Medium", "Small"]);
    }
}
