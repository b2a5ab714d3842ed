//! Static lookup tables for EEA member states and their CASP supervisors.

pub fn country_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "AT" => "Austria",
        "BE" => "Belgium",
        "BG" => "Bulgaria",
        "CY" => "Cyprus",
        "CZ" => "Czechia",
        "DE" => "Germany",
        "DK" => "Denmark",
        "EE" => "Estonia",
        "EL" | "GR" => "Greece",
        "ES" => "Spain",
        "FI" => "Finland",
        "FR" => "France",
        "HR" => "Croatia",
        "HU" => "Hungary",
        "IE" => "Ireland",
        "IS" => "Iceland",
        "IT" => "Italy",
        "LI" => "Liechtenstein",
        "LT" => "Lithuania",
        "LU" => "Luxembourg",
        "LV" => "Latvia",
        "MT" => "Malta",
        "NL" => "Netherlands",
        "NO" => "Norway",
        "PL" => "Poland",
        "PT" => "Portugal",
        "RO" => "Romania",
        "SE" => "Sweden",
        "SI" => "Slovenia",
        "SK" => "Slovakia",
        _ => return None,
    };
    Some(name)
}

/// Display name for a country code; unknown codes display as themselves.
pub fn country_display_name(code: &str) -> String {
    country_name(code).unwrap_or(code).to_string()
}

/// Short name of the national competent authority.
pub fn authority_short_name(code: &str) -> Option<&'static str> {
    let authority = match code {
        "AT" => "FMA",
        "BE" => "NBB",
        "BG" => "FSC",
        "CY" => "CySEC",
        "CZ" => "CNB",
        "DE" => "BaFin",
        "DK" => "DFSA",
        "EE" => "FSA",
        "ES" => "CNMV",
        "FI" => "FIN-FSA",
        "FR" => "AMF",
        "EL" | "GR" => "HCMC",
        "HR" => "HANFA",
        "HU" => "MNB",
        "IE" => "CBI",
        "IS" => "FME",
        "IT" => "CONSOB",
        "LI" => "FMA LI",
        "LT" => "Bank of Lithuania",
        "LU" => "CSSF",
        "LV" => "FKTK",
        "MT" => "MFSA",
        "NL" => "AFM",
        "NO" => "Finanstilsynet",
        "PL" => "KNF",
        "PT" => "CMVM",
        "RO" => "ASF",
        "SE" => "Finansinspektionen",
        "SI" => "ATVP",
        "SK" => "NBS",
        _ => return None,
    };
    Some(authority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greece_has_two_codes() {
        assert_eq!(country_name("EL"), Some("Greece"));
        assert_eq!(country_name("GR"), Some("Greece"));
        assert_eq!(authority_short_name("EL"), Some("HCMC"));
    }

    #[test]
    fn test_unknown_code_displays_as_itself() {
        assert_eq!(country_display_name("XX"), "XX");
        assert_eq!(authority_short_name("XX"), None);
    }
}
