//! Management surface
//!
//! `SimulationContext` is the handle a front end holds: it owns at most one
//! gNB, shares one event log with it and its UEs, and hands out serializable
//! snapshots.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use ransim_common::{Error, EventLog, GnbConfig, LogEvent, Result, Supi, UeConfig};
use ransim_ue::{UeMetrics, UeSnapshot};

use crate::entity::{GnbEntity, GnbMetrics, GnbSnapshot};

/// gNB counters together with every UE's counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationMetrics {
    pub gnb: Option<GnbMetrics>,
    pub ues: Vec<UeMetrics>,
}

/// A UE created by [`SimulationContext::add_ues`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedUe {
    pub ue_id: u32,
    pub imsi: String,
}

/// Handle onto one running simulation
#[derive(Debug, Default)]
pub struct SimulationContext {
    events: EventLog,
    gnb: Option<GnbEntity>,
}

impl SimulationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_log(events: EventLog) -> Self {
        Self { events, gnb: None }
    }

    /// Creates and starts a gNB, replacing (and stopping) any previous one.
    ///
    /// The gNB is kept even when start fails so its state can be inspected.
    pub async fn start_gnb(&mut self, config: GnbConfig) -> Result<()> {
        if let Some(mut previous) = self.gnb.take() {
            previous.stop().await?;
        }
        info!("Starting gNB {} towards AMF {}", config.name, config.amf_addr());
        let gnb = self.gnb.insert(GnbEntity::with_event_log(config, self.events.clone()));
        gnb.start().await
    }

    /// Stops the gNB. Without a gNB this does nothing.
    pub async fn stop_gnb(&mut self) -> Result<()> {
        match self.gnb.as_mut() {
            Some(gnb) => gnb.stop().await,
            None => Ok(()),
        }
    }

    pub fn gnb(&self) -> Option<&GnbEntity> {
        self.gnb.as_ref()
    }

    fn require_gnb(&self) -> Result<&GnbEntity> {
        self.gnb
            .as_ref()
            .ok_or_else(|| Error::InvalidOperation("gNB not running".to_string()))
    }

    pub async fn add_ue(&self, config: UeConfig) -> Result<u32> {
        self.require_gnb()?.add_ue(config).await
    }

    /// Adds `count` default subscribers with consecutive IMSIs, the first
    /// being `imsi_prefix`.
    pub async fn add_ues(&self, count: usize, imsi_prefix: &str) -> Result<Vec<AddedUe>> {
        let gnb = self.require_gnb()?;
        let first = Supi::parse(imsi_prefix)
            .ok_or_else(|| Error::Config(format!("Invalid IMSI prefix {imsi_prefix:?}")))?;
        let width = first.digits().len();
        let base: u64 = first
            .digits()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid IMSI prefix {imsi_prefix:?}")))?;

        let mut added = Vec::with_capacity(count);
        for i in 0..count as u64 {
            let digits = format!("{:0width$}", base + i, width = width);
            let supi = Supi::parse(&digits)
                .ok_or_else(|| Error::Config(format!("IMSI range overflows at {digits}")))?;
            let imsi = supi.to_string();
            let ue_id = gnb.add_ue(UeConfig::with_supi(supi)).await?;
            added.push(AddedUe { ue_id, imsi });
        }
        self.events.info(format!("Added {} UEs", count));
        Ok(added)
    }

    pub async fn remove_ue(&self, ue_id: u32) -> Result<()> {
        self.require_gnb()?.remove_ue(ue_id).await
    }

    pub async fn register_ue(&self, ue_id: u32) -> Result<()> {
        self.require_gnb()?.register_ue(ue_id).await
    }

    pub async fn deregister_ue(&self, ue_id: u32) -> Result<()> {
        self.require_gnb()?.deregister_ue(ue_id).await
    }

    pub async fn gnb_snapshot(&self) -> Option<GnbSnapshot> {
        match &self.gnb {
            Some(gnb) => Some(gnb.snapshot().await),
            None => None,
        }
    }

    pub async fn ue_snapshot(&self, ue_id: u32) -> Option<UeSnapshot> {
        self.gnb.as_ref()?.ue_snapshot(ue_id).await
    }

    /// Snapshots of every UE, ordered by id.
    pub async fn ue_snapshots(&self) -> Vec<UeSnapshot> {
        let Some(gnb) = &self.gnb else {
            return Vec::new();
        };
        let mut snapshots = Vec::new();
        for ue_id in gnb.ue_ids().await {
            if let Some(snapshot) = gnb.ue_snapshot(ue_id).await {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }

    pub async fn metrics(&self) -> SimulationMetrics {
        let Some(gnb) = &self.gnb else {
            return SimulationMetrics::default();
        };
        let mut ues = Vec::new();
        for ue_id in gnb.ue_ids().await {
            if let Some(metrics) = gnb.ue_metrics(ue_id).await {
                ues.push(metrics);
            }
        }
        SimulationMetrics {
            gnb: Some(gnb.metrics().await),
            ues,
        }
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }

    pub fn recent_logs(&self, limit: usize) -> Vec<LogEvent> {
        self.events.recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_operations_without_gnb() {
        let mut ctx = SimulationContext::new();
        assert!(matches!(ctx.add_ue(UeConfig::default()).await, Err(Error::InvalidOperation(_))));
        assert!(matches!(ctx.register_ue(1).await, Err(Error::InvalidOperation(_))));
        assert!(ctx.gnb_snapshot().await.is_none());
        assert!(ctx.metrics().await.gnb.is_none());
        ctx.stop_gnb().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_ues_consecutive_imsis() {
        let ctx = SimulationContext {
            events: EventLog::default(),
            gnb: Some(GnbEntity::new(GnbConfig::default())),
        };
        let added = ctx.add_ues(3, "imsi-208930000000009").await.unwrap();
        let imsis: Vec<&str> = added.iter().map(|ue| ue.imsi.as_str()).collect();
        assert_eq!(
            imsis,
            ["imsi-208930000000009", "imsi-208930000000010", "imsi-208930000000011"]
        );
        assert_eq!(ctx.ue_snapshots().await.len(), 3);
        assert_eq!(ctx.metrics().await.ues.len(), 3);

        assert!(matches!(ctx.add_ues(1, "tmsi-1").await, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_log_stream() {
        let ctx = SimulationContext::new();
        let mut rx = ctx.subscribe_logs();
        ctx.events.info("hello");
        assert_eq!(rx.recv().await.unwrap().message, "hello");
        assert_eq!(ctx.recent_logs(10).len(), 1);
    }
}
