// src/states.rs

//! Static FIPS codes for the jurisdictions a state-level expansion iterates.
//!
//! This is a closed set: all 50 states plus the District of Columbia and
//! Puerto Rico. It is never derived from the API.

pub static STATES_DC_AND_PR: &[&str] = &[
    "01", // AL
    "02", // AK
    "04", // AZ
    "05", // AR
    "06", // CA
    "08", // CO
    "09", // CT
    "10", // DE
    "11", // DC
    "12", // FL
    "13", // GA
    "15", // HI
    "16", // ID
    "17", // IL
    "18", // IN
    "19", // IA
    "20", // KS
    "21", // KY
    "22", // LA
    "23", // ME
    "24", // MD
    "25", // MA
    "26", // MI
    "27", // MN
    "28", // MS
    "29", // MO
    "30", // MT
    "31", // NE
    "32", // NV
    "33", // NH
    "34", // NJ
    "35", // NM
    "36", // NY
    "37", // NC
    "38", // ND
    "39", // OH
    "40", // OK
    "41", // OR
    "42", // PA
    "44", // RI
    "45", // SC
    "46", // SD
    "47", // TN
    "48", // TX
    "49", // UT
    "50", // VT
    "51", // VA
    "53", // WA
    "54", // WV
    "55", // WI
    "56", // WY
    "72", // PR
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fifty_states_plus_dc_and_pr() {
        assert_eq!(STATES_DC_AND_PR.len(), 52);
        assert!(STATES_DC_AND_PR.contains(&"11")); // DC
        assert!(STATES_DC_AND_PR.contains(&"72")); // PR
    }

    #[test]
    fn codes_are_distinct_two_digit_numbers() {
        let unique: HashSet<_> = STATES_DC_AND_PR.iter().collect();
        assert_eq!(unique.len(), STATES_DC_AND_PR.len());
        for code in STATES_DC_AND_PR {
            assert_eq!(code.len(), 2);
            assert!(code.chars().all(|c| c.is_ascii_digit()), "bad code {code}");
        }
    }
}
