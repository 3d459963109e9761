//! Port scanning application service.

use tracing::debug;

use crate::domain::{process_ports, PortGroup, PortInfo, ProcessedPorts};
use crate::error::Result;
use crate::ports::PortScannerPort;

/// Application service for port scanning operations.
///
/// Combines the scanner with grouping. It uses the `PortScannerPort` trait
/// for the actual scanning, allowing different implementations to be injected.
pub struct PortService<S: PortScannerPort> {
    scanner: S,
}

impl<S: PortScannerPort> PortService<S> {
    /// Create a new port service with the given scanner.
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }

    /// Scan and return the raw port list.
    pub async fn detect(&self) -> Result<Vec<PortInfo>> {
        self.scanner.scan().await
    }

    /// Scan and group, carrying group UI state over from `previous`.
    pub async fn refresh(&self, previous: &[PortGroup]) -> Result<ProcessedPorts> {
        let ports = self.scanner.scan().await?;
        let processed = process_ports(ports, previous);
        debug!(
            ports = processed.ports.len(),
            groups = processed.groups.len(),
            "ports refreshed"
        );
        Ok(processed)
    }

    /// Find every process bound to a port number.
    pub async fn find_by_port(&self, port: u16) -> Result<Vec<PortInfo>> {
        let mut ports = self.scanner.scan().await?;
        ports.retain(|p| p.port == port);
        Ok(ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;
    use crate::error::Error;

    /// Mock scanner for testing.
    struct MockScanner {
        ports: Vec<PortInfo>,
        fail: bool,
    }

    impl MockScanner {
        fn new(ports: Vec<PortInfo>) -> Self {
            Self { ports, fail: false }
        }
    }

    impl PortScannerPort for MockScanner {
        async fn scan(&self) -> Result<Vec<PortInfo>> {
            if self.fail {
                return Err(Error::CommandFailed("ss missing".to_string()));
            }
            Ok(self.ports.clone())
        }
    }

    fn mock_ports() -> Vec<PortInfo> {
        vec![
            PortInfo::new(3000, 1234, "node", "node server.js", "user", Protocol::Tcp),
            PortInfo::new(8080, 5678, "nginx", "nginx", "root", Protocol::Tcp),
            PortInfo::new(8080, 5679, "nginx", "nginx", "root", Protocol::Tcp),
        ]
    }

    #[tokio::test]
    async fn test_refresh_groups_ports() {
        let service = PortService::new(MockScanner::new(mock_ports()));

        let processed = service.refresh(&[]).await.unwrap();
        assert_eq!(processed.ports.len(), 3);
        assert_eq!(processed.groups.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_keeps_collapsed() {
        let service = PortService::new(MockScanner::new(mock_ports()));

        let mut first = service.refresh(&[]).await.unwrap();
        first.groups[0].collapsed = true;
        let second = service.refresh(&first.groups).await.unwrap();
        assert!(second.groups[0].collapsed);
    }

    #[tokio::test]
    async fn test_find_by_port() {
        let service = PortService::new(MockScanner::new(mock_ports()));

        let found = service.find_by_port(8080).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(service.find_by_port(9999).await.unwrap().is_empty());
    }

    #[test]
    fn test_scan_failure_propagates() {
        let service = PortService::new(MockScanner {
            ports: Vec::new(),
            fail: true,
        });
        assert!(tokio_test::block_on(service.refresh(&[])).is_err());
        assert!(tokio_test::block_on(service.detect()).is_err());
    }
}
