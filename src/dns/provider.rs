use super::types::MxRecord;

/// MX hostname substrings and the mailbox provider they reveal.
const PROVIDER_FINGERPRINTS: &[(&str, &str)] = &[
    ("google", "Google"),
    ("outlook", "Microsoft"),
    ("hotmail", "Microsoft"),
    ("zoho", "Zoho"),
    ("yahoodns", "Yahoo"),
    ("icloud", "Apple iCloud"),
    ("protonmail", "Proton"),
    ("pphosted", "Proofpoint"),
    ("mimecast", "Mimecast"),
    ("messagingengine", "Fastmail"),
    ("secureserver", "GoDaddy"),
    ("yandex", "Yandex"),
    ("amazonaws", "Amazon SES"),
    ("mailgun", "Mailgun"),
    ("ovh.net", "OVHcloud"),
    ("gandi.net", "Gandi"),
    ("ionos", "IONOS"),
];

/// Labels the mailbox provider from the MX exchanges, best priority first.
pub fn fingerprint_provider(records: &[MxRecord]) -> Option<&'static str> {
    records.iter().find_map(|record| {
        let host = record.exchange.to_ascii_lowercase();
        PROVIDER_FINGERPRINTS
            .iter()
            .find(|(needle, _)| host.contains(needle))
            .map(|(_, provider)| *provider)
    })
}
