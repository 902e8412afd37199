//! WHOIS over TCP port 43.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::dns::ascii_host;
use crate::probe::{WhoisProber, WhoisRecord, UNKNOWN};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn get_whois_server(tld: &str) -> String {
    match tld {
        "com" | "net" => "whois.verisign-grs.com:43".to_string(),
        "org" => "whois.pir.org:43".to_string(),
        "info" => "whois.afilias.net:43".to_string(),
        "biz" => "whois.neulevel.biz:43".to_string(),
        "us" => "whois.nic.us:43".to_string(),
        "co" => "whois.nic.co:43".to_string(),
        "io" => "whois.nic.io:43".to_string(),
        "me" => "whois.nic.me:43".to_string(),
        "uk" => "whois.nic.uk:43".to_string(),
        "ca" => "whois.cira.ca:43".to_string(),
        "de" => "whois.denic.de:43".to_string(),
        "fr" => "whois.afnic.fr:43".to_string(),
        "ru" => "whois.tcinet.ru:43".to_string(),
        "cn" => "whois.cnnic.net.cn:43".to_string(),
        "jp" => "whois.jprs.jp:43".to_string(),
        "au" => "whois.auda.org.au:43".to_string(),
        "br" => "whois.registro.br:43".to_string(),
        "pl" => "whois.dns.pl:43".to_string(),
        "eu" => "whois.eu:43".to_string(),
        "nl" => "whois.domain-registry.nl:43".to_string(),
        "app" | "dev" => "whois.nic.google:43".to_string(),
        "tech" => "whois.nic.tech:43".to_string(),
        _ => format!("whois.nic.{}:43", tld),
    }
}

/// Registration lookups against the registry (and registrar, when referred).
pub struct WhoisClient {
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(query_timeout: Duration) -> Self {
        Self {
            timeout: query_timeout,
        }
    }

    async fn query(&self, server: &str, name: &str) -> Result<String, BoxError> {
        let mut stream = timeout(self.timeout, TcpStream::connect(server)).await??;

        let query = format!("{}\r\n", name);
        timeout(self.timeout, stream.write_all(query.as_bytes())).await??;

        let mut response = Vec::new();
        timeout(self.timeout, stream.read_to_end(&mut response)).await??;
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    async fn fetch(&self, name: &str) -> Result<WhoisRecord, BoxError> {
        let host = ascii_host(name).ok_or("not a DNS name")?;
        let tld = host.rsplit('.').next().unwrap_or_default();
        let registry = get_whois_server(tld);

        let response = self.query(&registry, &host).await?;
        if is_not_found(&response) {
            return Ok(WhoisRecord::unknown());
        }

        let mut record = parse_whois(&response);
        // Thin registries only carry a pointer to the registrar's server.
        if let Some(referral) = referral_server(&response) {
            match self.query(&format!("{}:43", referral), &host).await {
                Ok(detail) => record = merge(parse_whois(&detail), record),
                Err(err) => debug!(name, %referral, error = %err, "registrar referral failed"),
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl WhoisProber for WhoisClient {
    async fn lookup(&self, name: &str) -> WhoisRecord {
        match self.fetch(name).await {
            Ok(record) => record,
            Err(err) => {
                warn!(name, error = %err, "WHOIS lookup failed");
                WhoisRecord::unknown()
            }
        }
    }
}

fn is_not_found(response: &str) -> bool {
    let lower = response.to_lowercase();
    [
        "no match",
        "not found",
        "no entries found",
        "domain status: available",
        "no data found",
    ]
    .iter()
    .any(|marker| lower.contains(marker))
}

fn referral_server(response: &str) -> Option<String> {
    fields(response)
        .find(|(key, _)| key == "registrar whois server" || key == "whois server")
        .map(|(_, value)| {
            value
                .trim_start_matches("whois://")
                .trim_end_matches('/')
                .to_string()
        })
        .filter(|server| !server.is_empty())
}

/// `key: value` pairs with lower-cased keys.
fn fields(response: &str) -> impl Iterator<Item = (String, String)> + '_ {
    response.lines().filter_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        if value.is_empty() || key.trim_start().starts_with('%') || key.trim_start().starts_with('#') {
            return None;
        }
        Some((key.trim().to_lowercase(), value.to_string()))
    })
}

/// Extracts the registration fields from a raw WHOIS response.
pub fn parse_whois(response: &str) -> WhoisRecord {
    let mut record = WhoisRecord::unknown();
    let mut name_servers: Vec<String> = Vec::new();
    let mut emails: Vec<String> = Vec::new();

    for (key, value) in fields(response) {
        match key.as_str() {
            "registrar" | "sponsoring registrar" | "registrar name" => {
                set_once(&mut record.registrar, value)
            }
            "registrant country" | "country" => set_once(&mut record.country, value),
            "creation date" | "created" | "created on" | "registered on" | "registration time" => {
                set_once(&mut record.creation_date, normalize_date(&value))
            }
            "registry expiry date"
            | "registrar registration expiration date"
            | "expiration date"
            | "expiry date"
            | "expires"
            | "paid-till" => set_once(&mut record.expiration_date, normalize_date(&value)),
            "name server" | "nserver" | "nameserver" => {
                let server = value
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .trim_end_matches('.')
                    .to_lowercase();
                if !server.is_empty() && !name_servers.contains(&server) {
                    name_servers.push(server);
                }
            }
            key if key.contains("email") => {
                let email = value.to_lowercase();
                if email.contains('@') && !emails.contains(&email) {
                    emails.push(email);
                }
            }
            _ => {}
        }
    }

    if !name_servers.is_empty() {
        record.name_servers = name_servers.join(", ");
    }
    if !emails.is_empty() {
        record.emails = emails.join(", ");
    }
    record
}

fn set_once(field: &mut String, value: String) {
    if field == UNKNOWN {
        *field = value;
    }
}

/// Fields known to `primary` win; gaps are filled from `fallback`.
fn merge(primary: WhoisRecord, fallback: WhoisRecord) -> WhoisRecord {
    let pick = |a: String, b: String| if a == UNKNOWN { b } else { a };
    WhoisRecord {
        registrar: pick(primary.registrar, fallback.registrar),
        country: pick(primary.country, fallback.country),
        creation_date: pick(primary.creation_date, fallback.creation_date),
        expiration_date: pick(primary.expiration_date, fallback.expiration_date),
        name_servers: pick(primary.name_servers, fallback.name_servers),
        emails: pick(primary.emails, fallback.emails),
    }
}

/// Reduces recognised timestamp formats to `YYYY-MM-DD`; anything else is kept verbatim.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y.%m.%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.date().to_string();
        }
    }
    for format in ["%Y-%m-%d", "%Y.%m.%d", "%d-%b-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN: &str = "   Domain Name: EXAMPLE.COM\r
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r
   Registrar WHOIS Server: whois.iana.org\r
   Updated Date: 2024-08-14T07:01:34Z\r
   Creation Date: 1995-08-14T04:00:00Z\r
   Registry Expiry Date: 2025-08-13T04:00:00Z\r
   Registrar: RESERVED-Internet Assigned Numbers Authority\r
   Registrar Abuse Contact Email: abuse@iana.org\r
   Name Server: A.IANA-SERVERS.NET\r
   Name Server: B.IANA-SERVERS.NET\r
>>> Last update of whois database: 2024-09-01T00:00:00Z <<<\r
";

    #[test]
    fn parses_registry_response() {
        let record = parse_whois(VERISIGN);
        assert_eq!(record.registrar, "RESERVED-Internet Assigned Numbers Authority");
        assert_eq!(record.creation_date, "1995-08-14");
        assert_eq!(record.expiration_date, "2025-08-13");
        assert_eq!(record.name_servers, "a.iana-servers.net, b.iana-servers.net");
        assert_eq!(record.emails, "abuse@iana.org");
        assert_eq!(record.country, UNKNOWN);
    }

    #[test]
    fn finds_registrar_referral() {
        assert_eq!(referral_server(VERISIGN).as_deref(), Some("whois.iana.org"));
        assert_eq!(referral_server("Domain Name: X.COM\n"), None);
    }

    #[test]
    fn ru_style_fields() {
        let record = parse_whois(
            "% comment: ignored\nnserver: ns1.example.ru.\ncreated: 2004.06.04 20:00:00\npaid-till: 2025.06.05\n",
        );
        assert_eq!(record.name_servers, "ns1.example.ru");
        assert_eq!(record.creation_date, "2004-06-04");
        assert_eq!(record.expiration_date, "2025-06-05");
    }

    #[test]
    fn detects_unregistered_names() {
        assert!(is_not_found("No match for \"EXAMPLEZZ.COM\".\r\n"));
        assert!(!is_not_found(VERISIGN));
    }

    #[test]
    fn date_normalisation() {
        assert_eq!(normalize_date("2025-01-10T12:00:00Z"), "2025-01-10");
        assert_eq!(normalize_date("2025-01-10 12:00:00"), "2025-01-10");
        assert_eq!(normalize_date("10-Jan-2025"), "2025-01-10");
        assert_eq!(normalize_date("before 1995"), "before 1995");
    }

    #[test]
    fn merge_prefers_known_fields() {
        let mut registrar = WhoisRecord::unknown();
        registrar.country = "PL".to_string();
        let mut registry = WhoisRecord::unknown();
        registry.country = "US".to_string();
        registry.registrar = "Registrar Inc.".to_string();

        let merged = merge(registrar, registry);
        assert_eq!(merged.country, "PL");
        assert_eq!(merged.registrar, "Registrar Inc.");
    }

    #[test]
    fn server_table_falls_back_to_nic() {
        assert_eq!(get_whois_server("com"), "whois.verisign-grs.com:43");
        assert_eq!(get_whois_server("xyz"), "whois.nic.xyz:43");
    }
}
