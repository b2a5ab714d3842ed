use crate::domain::model::{
    CountryCount, DashboardData, DirectoryEntry, FocusSummary, NamedProvider, ProviderRecord,
    ServiceCount,
};
use crate::domain::reference::{authority_short_name, country_display_name};
use crate::domain::services::{parse_services, CryptoService};
use std::collections::{HashMap, HashSet};

/// Occurrence counter that remembers first-seen order for tie-breaking.
#[derive(Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    /// Count descending; equal counts keep first-seen order.
    fn into_country_counts(self) -> Vec<CountryCount> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .map(|(code, count)| CountryCount {
                name: country_display_name(&code),
                code,
                count,
            })
            .collect()
    }
}

fn authority_for(record: &ProviderRecord, home: &str) -> String {
    match authority_short_name(home) {
        Some(short) => short.to_string(),
        None if !record.competent_authority.trim().is_empty() => {
            record.competent_authority.trim().to_string()
        }
        None => home.to_string(),
    }
}

/// Derives every dashboard figure from the register rows.
///
/// Statistics count each LEI once; the directory keeps one entry per row.
pub fn analyze(records: &[ProviderRecord], focus_country: &str) -> DashboardData {
    let mut seen_leis = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    let mut directory = Vec::with_capacity(records.len());

    for record in records {
        let duplicate = match record.lei() {
            Some(lei) => !seen_leis.insert(lei),
            None => false,
        };
        if duplicate {
            tracing::debug!(
                "Duplicate LEI {} for '{}', excluded from statistics",
                record.lei.trim(),
                record.lei_name
            );
        } else {
            unique.push(record);
        }

        let home = record.home_country();
        directory.push(DirectoryEntry {
            name: record.display_name().to_string(),
            entity: record.lei_name.trim().to_string(),
            home: home.to_string(),
            home_name: country_display_name(home),
            authority: authority_for(record, home),
            status: record.status(),
            authorised_on: record.authorisation_date.trim().to_string(),
            duplicate,
        });
    }

    let mut countries = OrderedCounter::default();
    let mut origins = OrderedCounter::default();
    let mut domestic = Vec::new();
    let mut cross_border_count = 0;
    let mut service_counts = [0usize; CryptoService::ALL.len()];

    for record in &unique {
        let home = record.home_country();
        if !home.is_empty() {
            countries.add(home);
        }

        if home == focus_country {
            domestic.push(NamedProvider {
                name: record.display_name().to_string(),
                entity: record.lei_name.trim().to_string(),
            });
        } else if record.is_passported_into(focus_country) {
            cross_border_count += 1;
            if !home.is_empty() {
                origins.add(home);
            }
        }

        for service in parse_services(&record.service_codes) {
            service_counts[service.index()] += 1;
        }
    }

    let services = CryptoService::ALL
        .iter()
        .filter(|service| service_counts[service.index()] > 0)
        .map(|service| ServiceCount {
            label: service.label().to_string(),
            count: service_counts[service.index()],
        })
        .collect();

    DashboardData {
        total_rows: records.len(),
        total: unique.len(),
        countries: countries.into_country_counts(),
        focus: FocusSummary {
            code: focus_country.to_string(),
            name: country_display_name(focus_country),
            authority: authority_short_name(focus_country)
                .unwrap_or("the national competent authority")
                .to_string(),
            domestic,
            cross_border_count,
            origins: origins.into_country_counts(),
        },
        services,
        directory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AuthorisationStatus;

    fn record(home: &str, name: &str, lei: &str) -> ProviderRecord {
        ProviderRecord {
            home_member_state: home.to_string(),
            lei_name: name.to_string(),
            lei: lei.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_lei_counts_once_but_stays_in_directory() {
        let records = vec![
            record("NL", "Alpha B.V.", "LEI-A"),
            record("NL", "Alpha B.V.", "LEI-A"),
            record("DE", "Beta GmbH", ""),
            record("DE", "Gamma GmbH", ""),
        ];
        let data = analyze(&records, "NL");

        assert_eq!(data.total_rows, 4);
        assert_eq!(data.total, 3);
        assert_eq!(data.duplicate_rows(), 1);
        assert_eq!(data.directory.len(), 4);
        assert!(!data.directory[0].duplicate);
        assert!(data.directory[1].duplicate);
        assert!(!data.directory[3].duplicate);
    }

    #[test]
    fn test_blank_home_is_not_an_origin() {
        let mut homeless = record("", "Nowhere Ltd", "LEI-X");
        homeless.service_countries = "NL".to_string();

        let data = analyze(&[homeless], "NL");

        assert_eq!(data.focus.cross_border_count, 1);
        assert!(data.focus.origins.is_empty());
        assert!(data.countries.is_empty());
        assert_eq!(data.directory.len(), 1);
    }

    #[test]
    fn test_country_ties_keep_first_seen_order() {
        let records = vec![
            record("FR", "A", ""),
            record("MT", "B", ""),
            record("DE", "C", ""),
            record("MT", "D", ""),
            record("DE", "E", ""),
        ];
        let data = analyze(&records, "NL");
        let order: Vec<&str> = data.countries.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(order, vec!["MT", "DE", "FR"]);
        assert_eq!(data.top_country().unwrap().name, "Malta");
        assert_eq!(data.num_countries(), 3);
    }

    #[test]
    fn test_focus_country_domestic_and_cross_border() {
        let mut passported = record("DE", "Beta GmbH", "LEI-B");
        passported.service_countries = "BE|NL|LU".to_string();
        let mut elsewhere = record("FR", "Gamma SAS", "LEI-C");
        elsewhere.service_countries = "BE, LU".to_string();
        let mut domestic = record("NL", "Alpha Holding B.V.", "LEI-A");
        domestic.commercial_name = "Alpha|Alpha Pro".to_string();
        domestic.service_countries = "NL".to_string();

        let data = analyze(&[passported, elsewhere, domestic], "NL");

        assert_eq!(data.focus.name, "Netherlands");
        assert_eq!(data.focus.authority, "AFM");
        assert_eq!(
            data.focus.domestic,
            vec![NamedProvider {
                name: "Alpha".to_string(),
                entity: "Alpha Holding B.V.".to_string()
            }]
        );
        assert_eq!(data.focus.cross_border_count, 1);
        assert_eq!(data.focus.active_count(), 2);
        assert_eq!(data.focus.origins[0].code, "DE");
        assert_eq!(data.focus.origins[0].name, "Germany");
    }

    #[test]
    fn test_services_in_canonical_order_without_zeros() {
        let mut a = record("NL", "A", "");
        a.service_codes = "placing of crypto-assets|custody of crypto-assets".to_string();
        let mut b = record("DE", "B", "");
        b.service_codes = "providing custody and administration|transfer services".to_string();

        let data = analyze(&[a, b], "NL");
        let services: Vec<(&str, usize)> = data
            .services
            .iter()
            .map(|s| (s.label.as_str(), s.count))
            .collect();
        assert_eq!(
            services,
            vec![
                ("Custody & admin", 2),
                ("Transfer services", 1),
                ("Placing", 1)
            ]
        );
    }

    #[test]
    fn test_directory_authority_and_status() {
        let mut unknown = record("XX", "Offshore Ltd", "");
        unknown.competent_authority = "Some Regulator".to_string();
        let mut withdrawn = record("", "Former S.A.", "");
        withdrawn.lei_country = "LU".to_string();
        withdrawn.authorisation_date = "2025-01-15".to_string();
        withdrawn.authorisation_end_date = "2025-09-01".to_string();

        let data = analyze(&[unknown, withdrawn], "NL");

        assert_eq!(data.directory[0].authority, "Some Regulator");
        assert_eq!(data.directory[0].home_name, "XX");
        assert_eq!(data.directory[1].home, "LU");
        assert_eq!(data.directory[1].authority, "CSSF");
        assert_eq!(data.directory[1].status, AuthorisationStatus::Withdrawn);
        assert_eq!(data.directory[1].authorised_on, "2025-01-15");
    }
}
