//! In-memory resolver for tests.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{DnsError, DnsLookup, MxRecord};

#[derive(Default)]
pub(crate) struct StubResolver {
    mx: HashMap<String, Vec<MxRecord>>,
    txt: HashMap<String, Vec<String>>,
    ips: HashMap<String, Vec<IpAddr>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    mx_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_mx(mut self, domain: &str, records: &[(u16, &str)]) -> Self {
        self.mx.insert(
            key(domain),
            records
                .iter()
                .map(|(priority, host)| MxRecord::new(*priority, *host))
                .collect(),
        );
        self
    }

    pub(crate) fn with_txt(mut self, name: &str, records: &[&str]) -> Self {
        self.txt
            .entry(key(name))
            .or_default()
            .extend(records.iter().map(|r| r.to_string()));
        self
    }

    pub(crate) fn with_ip(mut self, name: &str, ip: IpAddr) -> Self {
        self.ips.entry(key(name)).or_default().push(ip);
        self
    }

    /// Every lookup of `name` returns an error.
    pub(crate) fn failing(mut self, name: &str) -> Self {
        self.failing.insert(key(name));
        self
    }

    /// MX lookups sleep for `delay`, which makes concurrency observable.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn mx_calls(&self) -> usize {
        self.mx_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn check_failing(&self, name: &str) -> Result<(), DnsError> {
        if self.failing.contains(&key(name)) {
            Err(DnsError::Other {
                name: name.to_string(),
                message: "SERVFAIL".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl DnsLookup for StubResolver {
    async fn mx_records(&self, name: &str) -> Result<Vec<MxRecord>, DnsError> {
        self.mx_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.check_failing(name)?;
        Ok(self.mx.get(&key(name)).cloned().unwrap_or_default())
    }

    async fn txt_records(&self, name: &str) -> Result<Vec<String>, DnsError> {
        self.check_failing(name)?;
        Ok(self.txt.get(&key(name)).cloned().unwrap_or_default())
    }

    async fn ip_addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError> {
        self.check_failing(name)?;
        Ok(self.ips.get(&key(name)).cloned().unwrap_or_default())
    }
}

fn key(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
