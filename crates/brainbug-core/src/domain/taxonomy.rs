//! Fault taxonomy: fault acronym -> (category, canned fix suggestion).
//!
//! The table is a closed enum; lookups never fail. An acronym outside the
//! table classifies as itself with a generic fix suggestion.

use serde::{Deserialize, Serialize};

/// Fix suggestion used for acronyms outside the table.
pub const GENERIC_FIX_SUGGESTION: &str = "Fix the code implementation";

/// Known fault acronyms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum FaultCode {
    /// Wrong parameter/variable used in a call.
    Wpfv,
    /// Wrong logical expression.
    Wlec,
    /// Missing parameter in a function call.
    Mpfc,
    /// Missing condition in a logical expression.
    Mlec,
    /// Missing variable assignment.
    Mvav,
    /// Missing variable initialization.
    Mviv,
    /// Missing function call.
    Mfc,
    /// Wrong function called.
    Wfc,
    /// Wrong function implementation.
    Wfi,
    /// Wrong assigned value.
    Wav,
}

impl FaultCode {
    pub const ALL: [FaultCode; 10] = [
        FaultCode::Wpfv,
        FaultCode::Wlec,
        FaultCode::Mpfc,
        FaultCode::Mlec,
        FaultCode::Mvav,
        FaultCode::Mviv,
        FaultCode::Mfc,
        FaultCode::Wfc,
        FaultCode::Wfi,
        FaultCode::Wav,
    ];

    /// Parse an acronym. Surrounding whitespace is ignored; case is not.
    pub fn parse(acronym: &str) -> Option<Self> {
        match acronym.trim() {
            "WPFV" => Some(FaultCode::Wpfv),
            "WLEC" => Some(FaultCode::Wlec),
            "MPFC" => Some(FaultCode::Mpfc),
            "MLEC" => Some(FaultCode::Mlec),
            "MVAV" => Some(FaultCode::Mvav),
            "MVIV" => Some(FaultCode::Mviv),
            "MFC" => Some(FaultCode::Mfc),
            "WFC" => Some(FaultCode::Wfc),
            "WFI" => Some(FaultCode::Wfi),
            "WAV" => Some(FaultCode::Wav),
            _ => None,
        }
    }

    pub fn acronym(self) -> &'static str {
        match self {
            FaultCode::Wpfv => "WPFV",
            FaultCode::Wlec => "WLEC",
            FaultCode::Mpfc => "MPFC",
            FaultCode::Mlec => "MLEC",
            FaultCode::Mvav => "MVAV",
            FaultCode::Mviv => "MVIV",
            FaultCode::Mfc => "MFC",
            FaultCode::Wfc => "WFC",
            FaultCode::Wfi => "WFI",
            FaultCode::Wav => "WAV",
        }
    }

    /// Human-readable error category.
    pub fn category(self) -> &'static str {
        match self {
            FaultCode::Wpfv => "Wrong Parameter/Variable Used",
            FaultCode::Wlec => "Wrong Logical Expression",
            FaultCode::Mpfc => "Missing Parameter in Function Call",
            FaultCode::Mlec => "Missing Logical Expression Condition",
            FaultCode::Mvav => "Missing Variable Assignment",
            FaultCode::Mviv => "Missing Variable Initialization",
            FaultCode::Mfc => "Missing Function Call",
            FaultCode::Wfc => "Wrong Function Called",
            FaultCode::Wfi => "Wrong Function Implementation",
            FaultCode::Wav => "Wrong Assigned Value",
        }
    }

    /// Canned fix suggestion for this fault.
    pub fn fix_suggestion(self) -> &'static str {
        match self {
            FaultCode::Wpfv => "Use the correct variable/parameter in the function call",
            FaultCode::Wlec => "Fix the logical expression condition",
            FaultCode::Mpfc => "Add the missing parameter to the function call",
            FaultCode::Mlec => "Add the missing condition to the logical expression",
            FaultCode::Mvav => "Add the missing variable assignment",
            FaultCode::Mviv => "Initialize the variable before use",
            FaultCode::Mfc => "Add the missing function call",
            FaultCode::Wfc => "Call the correct function",
            FaultCode::Wfi => "Implement the function correctly",
            FaultCode::Wav => "Assign the correct value to the variable",
        }
    }
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.acronym())
    }
}

/// Outcome of a taxonomy lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    /// The parsed code, `None` when the acronym is not in the table.
    pub code: Option<FaultCode>,
    pub category: String,
    pub fix_suggestion: String,
}

impl Classification {
    pub fn is_known(&self) -> bool {
        self.code.is_some()
    }
}

/// Classify a fault acronym. Total: unknown acronyms fall back to the
/// acronym itself and [`GENERIC_FIX_SUGGESTION`].
pub fn classify(acronym: &str) -> Classification {
    match FaultCode::parse(acronym) {
        Some(code) => Classification {
            code: Some(code),
            category: code.category().to_string(),
            fix_suggestion: code.fix_suggestion().to_string(),
        },
        None => Classification {
            code: None,
            category: acronym.to_string(),
            fix_suggestion: GENERIC_FIX_SUGGESTION.to_string(),
        },
    }
}
