use serde::{Deserialize, Serialize};

/// Columns that must be present in the register header.
pub const REQUIRED_COLUMNS: &[&str] = &["ae_lei_name", "ae_homeMemberState"];

/// One row of the ESMA CASP register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderRecord {
    #[serde(rename = "ae_lei_name")]
    pub lei_name: String,
    #[serde(rename = "ae_homeMemberState")]
    pub home_member_state: String,
    #[serde(rename = "ae_competentAuthority", default)]
    pub competent_authority: String,
    #[serde(rename = "ae_lei", default)]
    pub lei: String,
    #[serde(rename = "ae_lei_cou_code", default)]
    pub lei_country: String,
    #[serde(rename = "ae_commercial_name", default)]
    pub commercial_name: String,
    #[serde(rename = "ac_authorisationNotificationDate", default)]
    pub authorisation_date: String,
    #[serde(rename = "ac_authorisationEndDate", default)]
    pub authorisation_end_date: String,
    #[serde(rename = "ac_serviceCode", default)]
    pub service_codes: String,
    #[serde(rename = "ac_serviceCode_cou", default)]
    pub service_countries: String,
}

impl ProviderRecord {
    /// Home member state, falling back to the LEI registration country.
    pub fn home_country(&self) -> &str {
        let home = self.home_member_state.trim();
        if home.is_empty() {
            self.lei_country.trim()
        } else {
            home
        }
    }

    /// First listed commercial name, or the legal name when none is given.
    pub fn display_name(&self) -> &str {
        let commercial = self
            .commercial_name
            .split('|')
            .next()
            .map(str::trim)
            .unwrap_or_default();
        if commercial.is_empty() {
            self.lei_name.trim()
        } else {
            commercial
        }
    }

    pub fn lei(&self) -> Option<&str> {
        Some(self.lei.trim()).filter(|lei| !lei.is_empty())
    }

    pub fn status(&self) -> AuthorisationStatus {
        if self.authorisation_end_date.trim().is_empty() {
            AuthorisationStatus::Authorised
        } else {
            AuthorisationStatus::Withdrawn
        }
    }

    /// Countries the provider passports its services into.
    pub fn passported_countries(&self) -> impl Iterator<Item = &str> {
        self.service_countries
            .split(['|', ','])
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn is_passported_into(&self, country: &str) -> bool {
        self.passported_countries().any(|code| code == country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthorisationStatus {
    Authorised,
    Withdrawn,
}

impl AuthorisationStatus {
    pub fn label(self) -> &'static str {
        match self {
            AuthorisationStatus::Authorised => "Authorised",
            AuthorisationStatus::Withdrawn => "Withdrawn",
        }
    }
}

/// Raw register text plus where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub origin: String,
    pub text: String,
    pub byte_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub code: String,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedProvider {
    pub name: String,
    pub entity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusSummary {
    pub code: String,
    pub name: String,
    pub authority: String,
    pub domestic: Vec<NamedProvider>,
    pub cross_border_count: usize,
    pub origins: Vec<CountryCount>,
}

impl FocusSummary {
    pub fn active_count(&self) -> usize {
        self.domestic.len() + self.cross_border_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub entity: String,
    pub home: String,
    pub home_name: String,
    pub authority: String,
    pub status: AuthorisationStatus,
    pub authorised_on: String,
    pub duplicate: bool,
}

/// Everything the dashboard shows, derived from one register snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardData {
    pub total_rows: usize,
    pub total: usize,
    pub countries: Vec<CountryCount>,
    pub focus: FocusSummary,
    pub services: Vec<ServiceCount>,
    pub directory: Vec<DirectoryEntry>,
}

impl DashboardData {
    pub fn num_countries(&self) -> usize {
        self.countries.len()
    }

    pub fn top_country(&self) -> Option<&CountryCount> {
        self.countries.first()
    }

    pub fn duplicate_rows(&self) -> usize {
        self.total_rows - self.total
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDashboard {
    pub html: String,
    pub summary_json: Option<String>,
    pub data: DashboardData,
}
