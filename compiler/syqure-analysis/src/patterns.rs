use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub(crate) static ref SHARETENSOR: Regex = Regex::new(r"\bSharetensor\b").unwrap();
    pub(crate) static ref CIPHERTENSOR: Regex = Regex::new(r"\bCiphertensor\b").unwrap();
    pub(crate) static ref MPU: Regex = Regex::new(r"\bMPU\b").unwrap();
    pub(crate) static ref MPP: Regex = Regex::new(r"\bMPP\b").unwrap();
    pub(crate) static ref MPA: Regex = Regex::new(r"\bMPA\b").unwrap();
    pub(crate) static ref MHE_MODULE: Regex = Regex::new(r"mpc\.mhe\b").unwrap();
    pub(crate) static ref LOCAL_DECORATOR: Regex = Regex::new(r"@local\b").unwrap();
    pub(crate) static ref ENCRYPT_CALL: Regex = Regex::new(r"\.encrypt\s*\(").unwrap();
    pub(crate) static ref DECRYPT_CALL: Regex = Regex::new(r"\.decrypt\s*\(|\.reveal\s*\(").unwrap();
}
