//! Advisory domains and their per-domain presentation profile

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the advisory subject areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "agri")]
    Agriculture,
    #[serde(rename = "legal")]
    Legal,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Agriculture, Domain::Legal];

    /// Wire name, also used as the backend path segment
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Agriculture => "agri",
            Domain::Legal => "legal",
        }
    }

    pub fn from_wire(name: &str) -> Option<Domain> {
        Domain::ALL.into_iter().find(|d| d.as_str() == name)
    }

    pub fn profile(self) -> &'static DomainProfile {
        match self {
            Domain::Agriculture => &AGRICULTURE,
            Domain::Legal => &LEGAL,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that differs between two advisory sessions apart from the gateway
#[derive(Debug, Serialize)]
pub struct DomainProfile {
    pub domain: Domain,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Seeded as the first turn of every new session; never sent to the backend
    pub greeting: &'static str,
    /// Text of the pending turn while a reply is outstanding
    pub placeholder: &'static str,
    pub input_hint: &'static str,
}

static AGRICULTURE: DomainProfile = DomainProfile {
    domain: Domain::Agriculture,
    title: "AgriBot",
    subtitle: "Agricultural Assistant",
    greeting: "Hello! I'm your Kenyan Agriculture Advisor. Ask about crops and diseases, \
               weather, or market prices.",
    placeholder: "Thinking...",
    input_hint: "Ask something...",
};

static LEGAL: DomainProfile = DomainProfile {
    domain: Domain::Legal,
    title: "LegalBot",
    subtitle: "Legal Advisory Assistant",
    greeting: "Welcome to Kenyan Legal Aid. I specialize exclusively in Kenyan law. Ask about \
               land rights, women's rights, ID/Passport issues, or legal disputes within Kenya.",
    placeholder: "Analyzing your legal question...",
    input_hint: "Ask your legal question...",
};
