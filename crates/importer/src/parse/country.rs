use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// ISO 3166-1: alpha-2, alpha-3, normalized short name.
const ISO_3166: &[(&str, &str, &str)] = &[
    ("AD", "AND", "ANDORRA"),
    ("AE", "ARE", "UNITED ARAB EMIRATES"),
    ("AF", "AFG", "AFGHANISTAN"),
    ("AG", "ATG", "ANTIGUA AND BARBUDA"),
    ("AI", "AIA", "ANGUILLA"),
    ("AL", "ALB", "ALBANIA"),
    ("AM", "ARM", "ARMENIA"),
    ("AO", "AGO", "ANGOLA"),
    ("AQ", "ATA", "ANTARCTICA"),
    ("AR", "ARG", "ARGENTINA"),
    ("AS", "ASM", "AMERICAN SAMOA"),
    ("AT", "AUT", "AUSTRIA"),
    ("AU", "AUS", "AUSTRALIA"),
    ("AW", "ABW", "ARUBA"),
    ("AX", "ALA", "ALAND ISLANDS"),
    ("AZ", "AZE", "AZERBAIJAN"),
    ("BA", "BIH", "BOSNIA AND HERZEGOVINA"),
    ("BB", "BRB", "BARBADOS"),
    ("BD", "BGD", "BANGLADESH"),
    ("BE", "BEL", "BELGIUM"),
    ("BF", "BFA", "BURKINA FASO"),
    ("BG", "BGR", "BULGARIA"),
    ("BH", "BHR", "BAHRAIN"),
    ("BI", "BDI", "BURUNDI"),
    ("BJ", "BEN", "BENIN"),
    ("BL", "BLM", "SAINT BARTHELEMY"),
    ("BM", "BMU", "BERMUDA"),
    ("BN", "BRN", "BRUNEI DARUSSALAM"),
    ("BO", "BOL", "BOLIVIA"),
    ("BQ", "BES", "BONAIRE SINT EUSTATIUS AND SABA"),
    ("BR", "BRA", "BRAZIL"),
    ("BS", "BHS", "BAHAMAS"),
    ("BT", "BTN", "BHUTAN"),
    ("BV", "BVT", "BOUVET ISLAND"),
    ("BW", "BWA", "BOTSWANA"),
    ("BY", "BLR", "BELARUS"),
    ("BZ", "BLZ", "BELIZE"),
    ("CA", "CAN", "CANADA"),
    ("CC", "CCK", "COCOS KEELING ISLANDS"),
    ("CD", "COD", "DEMOCRATIC REPUBLIC OF THE CONGO"),
    ("CF", "CAF", "CENTRAL AFRICAN REPUBLIC"),
    ("CG", "COG", "CONGO"),
    ("CH", "CHE", "SWITZERLAND"),
    ("CI", "CIV", "COTE D IVOIRE"),
    ("CK", "COK", "COOK ISLANDS"),
    ("CL", "CHL", "CHILE"),
    ("CM", "CMR", "CAMEROON"),
    ("CN", "CHN", "CHINA"),
    ("CO", "COL", "COLOMBIA"),
    ("CR", "CRI", "COSTA RICA"),
    ("CU", "CUB", "CUBA"),
    ("CV", "CPV", "CABO VERDE"),
    ("CW", "CUW", "CURACAO"),
    ("CX", "CXR", "CHRISTMAS ISLAND"),
    ("CY", "CYP", "CYPRUS"),
    ("CZ", "CZE", "CZECHIA"),
    ("DE", "DEU", "GERMANY"),
    ("DJ", "DJI", "DJIBOUTI"),
    ("DK", "DNK", "DENMARK"),
    ("DM", "DMA", "DOMINICA"),
    ("DO", "DOM", "DOMINICAN REPUBLIC"),
    ("DZ", "DZA", "ALGERIA"),
    ("EC", "ECU", "ECUADOR"),
    ("EE", "EST", "ESTONIA"),
    ("EG", "EGY", "EGYPT"),
    ("EH", "ESH", "WESTERN SAHARA"),
    ("ER", "ERI", "ERITREA"),
    ("ES", "ESP", "SPAIN"),
    ("ET", "ETH", "ETHIOPIA"),
    ("FI", "FIN", "FINLAND"),
    ("FJ", "FJI", "FIJI"),
    ("FK", "FLK", "FALKLAND ISLANDS"),
    ("FM", "FSM", "MICRONESIA"),
    ("FO", "FRO", "FAROE ISLANDS"),
    ("FR", "FRA", "FRANCE"),
    ("GA", "GAB", "GABON"),
    ("GB", "GBR", "UNITED KINGDOM"),
    ("GD", "GRD", "GRENADA"),
    ("GE", "GEO", "GEORGIA"),
    ("GF", "GUF", "FRENCH GUIANA"),
    ("GG", "GGY", "GUERNSEY"),
    ("GH", "GHA", "GHANA"),
    ("GI", "GIB", "GIBRALTAR"),
    ("GL", "GRL", "GREENLAND"),
    ("GM", "GMB", "GAMBIA"),
    ("GN", "GIN", "GUINEA"),
    ("GP", "GLP", "GUADELOUPE"),
    ("GQ", "GNQ", "EQUATORIAL GUINEA"),
    ("GR", "GRC", "GREECE"),
    ("GS", "SGS", "SOUTH GEORGIA AND THE SOUTH SANDWICH ISLANDS"),
    ("GT", "GTM", "GUATEMALA"),
    ("GU", "GUM", "GUAM"),
    ("GW", "GNB", "GUINEA BISSAU"),
    ("GY", "GUY", "GUYANA"),
    ("HK", "HKG", "HONG KONG"),
    ("HM", "HMD", "HEARD ISLAND AND MCDONALD ISLANDS"),
    ("HN", "HND", "HONDURAS"),
    ("HR", "HRV", "CROATIA"),
    ("HT", "HTI", "HAITI"),
    ("HU", "HUN", "HUNGARY"),
    ("ID", "IDN", "INDONESIA"),
    ("IE", "IRL", "IRELAND"),
    ("IL", "ISR", "ISRAEL"),
    ("IM", "IMN", "ISLE OF MAN"),
    ("IN", "IND", "INDIA"),
    ("IO", "IOT", "BRITISH INDIAN OCEAN TERRITORY"),
    ("IQ", "IRQ", "IRAQ"),
    ("IR", "IRN", "IRAN"),
    ("IS", "ISL", "ICELAND"),
    ("IT", "ITA", "ITALY"),
    ("JE", "JEY", "JERSEY"),
    ("JM", "JAM", "JAMAICA"),
    ("JO", "JOR", "JORDAN"),
    ("JP", "JPN", "JAPAN"),
    ("KE", "KEN", "KENYA"),
    ("KG", "KGZ", "KYRGYZSTAN"),
    ("KH", "KHM", "CAMBODIA"),
    ("KI", "KIR", "KIRIBATI"),
    ("KM", "COM", "COMOROS"),
    ("KN", "KNA", "SAINT KITTS AND NEVIS"),
    ("KP", "PRK", "NORTH KOREA"),
    ("KR", "KOR", "SOUTH KOREA"),
    ("KW", "KWT", "KUWAIT"),
    ("KY", "CYM", "CAYMAN ISLANDS"),
    ("KZ", "KAZ", "KAZAKHSTAN"),
    ("LA", "LAO", "LAOS"),
    ("LB", "LBN", "LEBANON"),
    ("LC", "LCA", "SAINT LUCIA"),
    ("LI", "LIE", "LIECHTENSTEIN"),
    ("LK", "LKA", "SRI LANKA"),
    ("LR", "LBR", "LIBERIA"),
    ("LS", "LSO", "LESOTHO"),
    ("LT", "LTU", "LITHUANIA"),
    ("LU", "LUX", "LUXEMBOURG"),
    ("LV", "LVA", "LATVIA"),
    ("LY", "LBY", "LIBYA"),
    ("MA", "MAR", "MOROCCO"),
    ("MC", "MCO", "MONACO"),
    ("MD", "MDA", "MOLDOVA"),
    ("ME", "MNE", "MONTENEGRO"),
    ("MF", "MAF", "SAINT MARTIN"),
    ("MG", "MDG", "MADAGASCAR"),
    ("MH", "MHL", "MARSHALL ISLANDS"),
    ("MK", "MKD", "NORTH MACEDONIA"),
    ("ML", "MLI", "MALI"),
    ("MM", "MMR", "MYANMAR"),
    ("MN", "MNG", "MONGOLIA"),
    ("MO", "MAC", "MACAO"),
    ("MP", "MNP", "NORTHERN MARIANA ISLANDS"),
    ("MQ", "MTQ", "MARTINIQUE"),
    ("MR", "MRT", "MAURITANIA"),
    ("MS", "MSR", "MONTSERRAT"),
    ("MT", "MLT", "MALTA"),
    ("MU", "MUS", "MAURITIUS"),
    ("MV", "MDV", "MALDIVES"),
    ("MW", "MWI", "MALAWI"),
    ("MX", "MEX", "MEXICO"),
    ("MY", "MYS", "MALAYSIA"),
    ("MZ", "MOZ", "MOZAMBIQUE"),
    ("NA", "NAM", "NAMIBIA"),
    ("NC", "NCL", "NEW CALEDONIA"),
    ("NE", "NER", "NIGER"),
    ("NF", "NFK", "NORFOLK ISLAND"),
    ("NG", "NGA", "NIGERIA"),
    ("NI", "NIC", "NICARAGUA"),
    ("NL", "NLD", "NETHERLANDS"),
    ("NO", "NOR", "NORWAY"),
    ("NP", "NPL", "NEPAL"),
    ("NR", "NRU", "NAURU"),
    ("NU", "NIU", "NIUE"),
    ("NZ", "NZL", "NEW ZEALAND"),
    ("OM", "OMN", "OMAN"),
    ("PA", "PAN", "PANAMA"),
    ("PE", "PER", "PERU"),
    ("PF", "PYF", "FRENCH POLYNESIA"),
    ("PG", "PNG", "PAPUA NEW GUINEA"),
    ("PH", "PHL", "PHILIPPINES"),
    ("PK", "PAK", "PAKISTAN"),
    ("PL", "POL", "POLAND"),
    ("PM", "SPM", "SAINT PIERRE AND MIQUELON"),
    ("PN", "PCN", "PITCAIRN"),
    ("PR", "PRI", "PUERTO RICO"),
    ("PS", "PSE", "PALESTINE"),
    ("PT", "PRT", "PORTUGAL"),
    ("PW", "PLW", "PALAU"),
    ("PY", "PRY", "PARAGUAY"),
    ("QA", "QAT", "QATAR"),
    ("RE", "REU", "REUNION"),
    ("RO", "ROU", "ROMANIA"),
    ("RS", "SRB", "SERBIA"),
    ("RU", "RUS", "RUSSIA"),
    ("RW", "RWA", "RWANDA"),
    ("SA", "SAU", "SAUDI ARABIA"),
    ("SB", "SLB", "SOLOMON ISLANDS"),
    ("SC", "SYC", "SEYCHELLES"),
    ("SD", "SDN", "SUDAN"),
    ("SE", "SWE", "SWEDEN"),
    ("SG", "SGP", "SINGAPORE"),
    ("SH", "SHN", "SAINT HELENA"),
    ("SI", "SVN", "SLOVENIA"),
    ("SJ", "SJM", "SVALBARD AND JAN MAYEN"),
    ("SK", "SVK", "SLOVAKIA"),
    ("SL", "SLE", "SIERRA LEONE"),
    ("SM", "SMR", "SAN MARINO"),
    ("SN", "SEN", "SENEGAL"),
    ("SO", "SOM", "SOMALIA"),
    ("SR", "SUR", "SURINAME"),
    ("SS", "SSD", "SOUTH SUDAN"),
    ("ST", "STP", "SAO TOME AND PRINCIPE"),
    ("SV", "SLV", "EL SALVADOR"),
    ("SX", "SXM", "SINT MAARTEN"),
    ("SY", "SYR", "SYRIA"),
    ("SZ", "SWZ", "ESWATINI"),
    ("TC", "TCA", "TURKS AND CAICOS ISLANDS"),
    ("TD", "TCD", "CHAD"),
    ("TF", "ATF", "FRENCH SOUTHERN TERRITORIES"),
    ("TG", "TGO", "TOGO"),
    ("TH", "THA", "THAILAND"),
    ("TJ", "TJK", "TAJIKISTAN"),
    ("TK", "TKL", "TOKELAU"),
    ("TL", "TLS", "TIMOR LESTE"),
    ("TM", "TKM", "TURKMENISTAN"),
    ("TN", "TUN", "TUNISIA"),
    ("TO", "TON", "TONGA"),
    ("TR", "TUR", "TURKIYE"),
    ("TT", "TTO", "TRINIDAD AND TOBAGO"),
    ("TV", "TUV", "TUVALU"),
    ("TW", "TWN", "TAIWAN"),
    ("TZ", "TZA", "TANZANIA"),
    ("UA", "UKR", "UKRAINE"),
    ("UG", "UGA", "UGANDA"),
    ("UM", "UMI", "UNITED STATES MINOR OUTLYING ISLANDS"),
    ("US", "USA", "UNITED STATES"),
    ("UY", "URY", "URUGUAY"),
    ("UZ", "UZB", "UZBEKISTAN"),
    ("VA", "VAT", "HOLY SEE"),
    ("VC", "VCT", "SAINT VINCENT AND THE GRENADINES"),
    ("VE", "VEN", "VENEZUELA"),
    ("VG", "VGB", "BRITISH VIRGIN ISLANDS"),
    ("VI", "VIR", "UNITED STATES VIRGIN ISLANDS"),
    ("VN", "VNM", "VIET NAM"),
    ("VU", "VUT", "VANUATU"),
    ("WF", "WLF", "WALLIS AND FUTUNA"),
    ("WS", "WSM", "SAMOA"),
    ("YE", "YEM", "YEMEN"),
    ("YT", "MYT", "MAYOTTE"),
    ("ZA", "ZAF", "SOUTH AFRICA"),
    ("ZM", "ZMB", "ZAMBIA"),
    ("ZW", "ZWE", "ZIMBABWE"),
];

/// Common and historical names, plus sporting codes that differ from alpha-3.
const ALIASES: &[(&str, &str)] = &[
    ("GREAT BRITAIN", "GB"),
    ("BRITAIN", "GB"),
    ("UK", "GB"),
    ("ENGLAND", "GB"),
    ("SCOTLAND", "GB"),
    ("WALES", "GB"),
    ("NORTHERN IRELAND", "GB"),
    ("HOLLAND", "NL"),
    ("CZECH REPUBLIC", "CZ"),
    ("BRASIL", "BR"),
    ("TURKEY", "TR"),
    ("RUSSIAN FEDERATION", "RU"),
    ("UNITED STATES OF AMERICA", "US"),
    ("AMERICA", "US"),
    ("VIETNAM", "VN"),
    ("IVORY COAST", "CI"),
    ("KOREA", "KR"),
    ("REPUBLIC OF KOREA", "KR"),
    ("MACEDONIA", "MK"),
    ("SWAZILAND", "SZ"),
    ("EAST TIMOR", "TL"),
    ("VATICAN", "VA"),
    ("VATICAN CITY", "VA"),
    ("CAPE VERDE", "CV"),
    ("BURMA", "MM"),
    ("DR CONGO", "CD"),
    ("REPUBLIC OF THE CONGO", "CG"),
    ("ESPANA", "ES"),
    ("ITALIA", "IT"),
    ("DEUTSCHLAND", "DE"),
    ("CHINESE TAIPEI", "TW"),
    ("MACAU", "MO"),
    ("BRUNEI", "BN"),
    ("MOLDOVA REPUBLIC OF", "MD"),
    ("PALESTINIAN TERRITORY", "PS"),
    ("GER", "DE"),
    ("NED", "NL"),
    ("SUI", "CH"),
    ("RSA", "ZA"),
    ("POR", "PT"),
    ("INA", "ID"),
    ("MAL", "MY"),
    ("SLO", "SI"),
    ("DEN", "DK"),
    ("PHI", "PH"),
    ("CRO", "HR"),
    ("GRE", "GR"),
    ("CHI", "CL"),
    ("URU", "UY"),
    ("PAR", "PY"),
    ("LAT", "LV"),
    ("BUL", "BG"),
    ("KSA", "SA"),
    ("UAE", "AE"),
    ("TPE", "TW"),
    ("IRI", "IR"),
    ("ISV", "VI"),
    ("MON", "MC"),
    ("NGR", "NG"),
];

lazy_static! {
    /// Normalized name, alias or alpha-3 code → alpha-2.
    static ref COUNTRIES: HashMap<&'static str, &'static str> = ISO_3166
        .iter()
        .flat_map(|&(alpha2, alpha3, name)| [(name, alpha2), (alpha3, alpha2)])
        .chain(ALIASES.iter().copied())
        .collect();

    static ref ALPHA2: HashSet<&'static str> = ISO_3166.iter().map(|&(alpha2, _, _)| alpha2).collect();
}

/// Decomposes, drops combining marks, upper-cases, turns punctuation into
/// spaces and drops a leading article, so "the Netherlands", "NETHERLANDS"
/// and composed or decomposed accents share a key.
pub fn normalize(name: &str) -> String {
    let cleaned: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphabetic() { c } else { ' ' })
        .collect();
    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    match joined.strip_prefix("THE ") {
        Some(rest) => rest.to_string(),
        None => joined,
    }
}

/// Maps a free-text country name to its ISO2 code. Unknown names give `None`.
pub fn to_iso2(name: &str) -> Option<&'static str> {
    let key = normalize(name);
    if key.is_empty() {
        return None;
    }

    if let Some(code) = COUNTRIES.get(key.as_str()) {
        return Some(*code);
    }

    // Already an alpha-2 code.
    ALPHA2.get(key.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(to_iso2("SPAIN"), Some("ES"));
        assert_eq!(to_iso2("Italy"), Some("IT"));
        assert_eq!(to_iso2("the Netherlands"), Some("NL"));
        assert_eq!(to_iso2("  south   africa "), Some("ZA"));
        assert_eq!(to_iso2("United-Kingdom"), Some("GB"));
        assert_eq!(to_iso2("Côte d'Ivoire"), Some("CI"));
    }

    #[test]
    fn test_accents_fold() {
        assert_eq!(to_iso2("TÜRKIYE"), Some("TR"));
        assert_eq!(to_iso2("México"), Some("MX"));
        assert_eq!(to_iso2("Curaçao"), Some("CW"));
    }

    #[test]
    fn test_decomposed_accents_fold() {
        assert_eq!(to_iso2("Me\u{301}xico"), Some("MX"));
        assert_eq!(to_iso2("Tu\u{308}rkiye"), Some("TR"));
        assert_eq!(normalize("Re\u{301}union"), "REUNION");
    }

    #[test]
    fn test_countries_beyond_the_usual_grid() {
        for (name, code) in [
            ("Norway", "NO"),
            ("Chile", "CL"),
            ("Luxembourg", "LU"),
            ("Israel", "IL"),
            ("Greece", "GR"),
            ("Estonia", "EE"),
            ("Uruguay", "UY"),
            ("Morocco", "MA"),
            ("Iceland", "IS"),
            ("Viet Nam", "VN"),
        ] {
            assert_eq!(to_iso2(name), Some(code), "{name}");
        }
    }

    #[test]
    fn test_codes_pass_through() {
        assert_eq!(to_iso2("ESP"), Some("ES"));
        assert_eq!(to_iso2("GER"), Some("DE"));
        assert_eq!(to_iso2("NOR"), Some("NO"));
        assert_eq!(to_iso2("es"), Some("ES"));
        assert_eq!(to_iso2("JP"), Some("JP"));
        assert_eq!(to_iso2("ZW"), Some("ZW"));
    }

    #[test]
    fn test_unknown_is_absent() {
        assert_eq!(to_iso2("ATLANTIS"), None);
        assert_eq!(to_iso2("ZZ"), None);
        assert_eq!(to_iso2(""), None);
        assert_eq!(to_iso2("---"), None);
    }

    #[test]
    fn test_table_is_consistent() {
        assert_eq!(ISO_3166.len(), 249);
        assert_eq!(ALPHA2.len(), 249);
        for &(alpha2, alpha3, name) in ISO_3166 {
            assert_eq!(alpha2.len(), 2);
            assert!(alpha2.chars().all(|c| c.is_ascii_uppercase()));
            assert_eq!(alpha3.len(), 3);
            assert_eq!(normalize(name), name);
            assert_eq!(to_iso2(name), Some(alpha2), "{name}");
            assert_eq!(to_iso2(alpha3), Some(alpha2), "{alpha3}");
        }
        for &(alias, alpha2) in ALIASES {
            assert_eq!(normalize(alias), alias);
            assert!(ALPHA2.contains(alpha2), "{alias}");
        }
    }
}
