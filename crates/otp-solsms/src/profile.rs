//! Per-vendor wire details.
//!
//! Both bulk-SMS APIs take the same form-encoded POST and answer with a
//! human readable status line. They differ in the authentication field,
//! the discriminator field, the default endpoint and how long a number
//! they accept.

/// Wire mapping for one bulk-SMS vendor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorProfile {
    /// Provider id registered with the gateway.
    pub provider_id: &'static str,
    /// Endpoint used when the configuration has no `RootURL`.
    pub default_url: &'static str,
    /// Form field carrying the API key.
    pub key_field: &'static str,
    /// Fixed `(field, value)` pair the vendor uses to select its SMS API.
    pub discriminator: (&'static str, &'static str),
    /// Substring a response body must contain for the send to count as delivered.
    pub success_marker: &'static str,
    /// Address length cap, `None` when the vendor does not impose one.
    pub max_address_len: Option<usize>,
    /// Prompt shown when asking for the number.
    pub address_desc: &'static str,
}

impl VendorProfile {
    /// Kaleyra v4 alerts API.
    pub const KALEYRA: VendorProfile = VendorProfile {
        provider_id: "solsms",
        default_url: "https://api-alerts.kaleyra.com/v4/",
        key_field: "api_key",
        discriminator: ("method", "sms"),
        success_marker: "responsecode 200",
        max_address_len: Some(10),
        address_desc: "Please enter your mobile number",
    };

    /// Older Solutions Infini web2sms API, keyed by a working key.
    pub const SOLUTIONS_INFINI: VendorProfile = VendorProfile {
        provider_id: "solsms-legacy",
        default_url: "https://alerts.solutionsinfini.com/api/web2sms.php",
        key_field: "workingkey",
        discriminator: ("api", "http"),
        success_marker: "responsecode 200",
        max_address_len: None,
        address_desc: "Please enter your mobile number with the country code",
    };
}

impl Default for VendorProfile {
    fn default() -> Self {
        Self::KALEYRA
    }
}
