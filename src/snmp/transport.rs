use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Result, YmError};
use crate::models::device::{SnmpConfig, SnmpVersion};
use crate::snmp::cache::SnmpCache;
use crate::snmp::pdu::{
    self, Message, PduHeader, RawValue, SnmpErrorCode, Varbind, PDU_GET_BULK_REQUEST, PDU_GET_NEXT_REQUEST,
    PDU_GET_REQUEST, PDU_SET_REQUEST,
};
use crate::snmp::session_table::{SessionKey, SessionTable};
use crate::snmp::validator;

const MAX_WALK_ITERATIONS: usize = 2000;

fn protocol_version_byte(version: SnmpVersion) -> u8 {
    match version {
        SnmpVersion::V1 => 0,
        SnmpVersion::V2c => 1,
        // USM framing for v3 is not implemented over this transport yet
        // (see DESIGN.md); callers get a clear SnmpError instead of a
        // silently-wrong encode.
        SnmpVersion::V3 => 3,
    }
}

/// SNMP session/transport component: opens (or reuses) a UDP session
/// per device, encodes/decodes PDUs, retries on timeout, and serves
/// reads from the TTL cache before hitting the wire.
#[derive(Clone)]
pub struct SnmpTransport {
    sessions: SessionTable,
    cache: SnmpCache,
}

impl SnmpTransport {
    pub fn new(sessions: SessionTable, cache: SnmpCache) -> Self {
        Self { sessions, cache }
    }

    async fn send_request(&self, address: &str, config: &SnmpConfig, pdu: PduHeader) -> Result<PduHeader> {
        if config.version == SnmpVersion::V3 {
            return Err(YmError::SnmpError {
                code: SnmpErrorCode::GenErr,
            });
        }

        let key = SessionKey::new(address, config.port, config.version);
        let session = self.sessions.get_or_create(key, config.transport);
        let request_id = session.next_request_id();

        let message = Message {
            version: protocol_version_byte(config.version),
            community: config.community.clone().unwrap_or_default(),
            pdu: PduHeader {
                request_id,
                ..pdu
            },
        };
        let encoded = pdu::encode_message(&message).map_err(|_| YmError::SnmpError {
            code: SnmpErrorCode::GenErr,
        })?;

        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(|_| YmError::Unreachable {
            device_id: address.to_string(),
        })?;
        let peer = format!("{}:{}", address, config.port);
        socket.connect(&peer).await.map_err(|_| YmError::Unreachable {
            device_id: address.to_string(),
        })?;

        let mut last_err = YmError::Timeout;
        for attempt in 0..=config.retries {
            socket.send(&encoded).await.map_err(|_| YmError::Unreachable {
                device_id: address.to_string(),
            })?;

            let mut buf = vec![0u8; 65535];
            match timeout(Duration::from_millis(config.timeout_ms as u64), socket.recv(&mut buf)).await {
                Ok(Ok(n)) => {
                    let decoded = pdu::decode_message(&buf[..n]).map_err(|_| YmError::SnmpError {
                        code: SnmpErrorCode::GenErr,
                    })?;
                    return Ok(decoded.pdu);
                }
                Ok(Err(e)) => {
                    last_err = YmError::Unreachable {
                        device_id: address.to_string(),
                    };
                    warn!(device = address, error = %e, attempt, "snmp socket error");
                }
                Err(_) => {
                    last_err = YmError::Timeout;
                    debug!(device = address, attempt, "snmp request timed out, retrying");
                }
            }
        }
        Err(last_err)
    }

    fn check_error_status(pdu: &PduHeader) -> Result<()> {
        if pdu.error_status != 0 {
            return Err(YmError::SnmpError {
                code: SnmpErrorCode::from_status(pdu.error_status),
            });
        }
        Ok(())
    }

    pub async fn get(&self, address: &str, config: &SnmpConfig, oids: &[String]) -> Result<Vec<Varbind>> {
        validator::validate_oid_list(oids)?;
        let cache_key = SnmpCache::key(address, "get", oids);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }
        let pdu = PduHeader {
            pdu_type: PDU_GET_REQUEST,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds: oids
                .iter()
                .map(|oid| Varbind {
                    oid: oid.clone(),
                    value: RawValue::Null,
                })
                .collect(),
        };
        let response = self.send_request(address, config, pdu).await?;
        Self::check_error_status(&response)?;
        self.cache.put(cache_key, response.varbinds.clone());
        Ok(response.varbinds)
    }

    pub async fn get_next(&self, address: &str, config: &SnmpConfig, oids: &[String]) -> Result<Vec<Varbind>> {
        validator::validate_oid_list(oids)?;
        let pdu = PduHeader {
            pdu_type: PDU_GET_NEXT_REQUEST,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds: oids
                .iter()
                .map(|oid| Varbind {
                    oid: oid.clone(),
                    value: RawValue::Null,
                })
                .collect(),
        };
        let response = self.send_request(address, config, pdu).await?;
        Self::check_error_status(&response)?;
        Ok(response.varbinds)
    }

    pub async fn get_bulk(
        &self,
        address: &str,
        config: &SnmpConfig,
        oids: &[String],
        non_repeaters: i64,
        max_repetitions: i64,
    ) -> Result<Vec<Varbind>> {
        validator::validate_oid_list(oids)?;
        validator::validate_bulk_parameters(non_repeaters, max_repetitions)?;

        if config.version == SnmpVersion::V1 {
            // GETBULK doesn't exist in v1; emulate it with repeated
            // GetNext instead of sending a PDU the agent would reject.
            return self
                .get_bulk_via_get_next(address, config, oids, non_repeaters, max_repetitions)
                .await;
        }

        let cache_key = SnmpCache::key(address, "bulk", oids);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }
        let pdu = PduHeader {
            pdu_type: PDU_GET_BULK_REQUEST,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            non_repeaters,
            max_repetitions,
            varbinds: oids
                .iter()
                .map(|oid| Varbind {
                    oid: oid.clone(),
                    value: RawValue::Null,
                })
                .collect(),
        };
        let response = self.send_request(address, config, pdu).await?;
        Self::check_error_status(&response)?;
        self.cache.put(cache_key, response.varbinds.clone());
        Ok(response.varbinds)
    }

    /// v1 fallback for `get_bulk`: the first `non_repeaters` OIDs get a
    /// single GetNext each, the rest get up to `max_repetitions`
    /// chained GetNext calls, mirroring GETBULK's own semantics.
    async fn get_bulk_via_get_next(
        &self,
        address: &str,
        config: &SnmpConfig,
        oids: &[String],
        non_repeaters: i64,
        max_repetitions: i64,
    ) -> Result<Vec<Varbind>> {
        let cache_key = SnmpCache::key(address, "bulk", oids);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }
        let non_repeaters = non_repeaters.max(0) as usize;
        let max_repetitions = max_repetitions.max(1) as usize;
        let mut results = Vec::new();
        for (i, oid) in oids.iter().enumerate() {
            let mut current = oid.clone();
            let reps = if i < non_repeaters { 1 } else { max_repetitions };
            for _ in 0..reps {
                let Some(vb) = self
                    .get_next(address, config, std::slice::from_ref(&current))
                    .await?
                    .into_iter()
                    .next()
                else {
                    break;
                };
                let is_exception = vb.value.is_exception();
                current = vb.oid.clone();
                results.push(vb);
                if is_exception {
                    break;
                }
            }
        }
        self.cache.put(cache_key, results.clone());
        Ok(results)
    }

    pub async fn set(&self, address: &str, config: &SnmpConfig, varbinds: Vec<Varbind>) -> Result<Vec<Varbind>> {
        let oids: Vec<String> = varbinds.iter().map(|v| v.oid.clone()).collect();
        validator::validate_oid_list(&oids)?;
        let pdu = PduHeader {
            pdu_type: PDU_SET_REQUEST,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds,
        };
        let response = self.send_request(address, config, pdu).await?;
        Self::check_error_status(&response)?;
        self.cache.invalidate_device(address);
        Ok(response.varbinds)
    }

    /// Walks a subtree via repeated GetNext (v1) or one GetBulk pass
    /// (v2c), stopping at the first OID outside the root or an
    /// end-of-MIB-view exception, per spec.md §4.1's walk contract.
    pub async fn walk(&self, address: &str, config: &SnmpConfig, root_oid: &str) -> Result<Vec<Varbind>> {
        validator::validate_oid(root_oid)?;
        let root_oids = [root_oid.to_string()];
        let cache_key = SnmpCache::key(address, "walk", &root_oids);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let mut results = Vec::new();
        let mut current = root_oid.trim_start_matches('.').to_string();

        for _ in 0..MAX_WALK_ITERATIONS {
            let next_varbinds = match config.version {
                SnmpVersion::V2c => {
                    self.get_bulk(address, config, std::slice::from_ref(&current), 0, 10).await?
                }
                _ => self.get_next(address, config, std::slice::from_ref(&current)).await?,
            };

            let mut done = false;
            for vb in next_varbinds {
                if !vb.oid.starts_with(&format!("{root_oid}.")) && vb.oid != root_oid || vb.value.is_exception() {
                    done = true;
                    break;
                }
                current = vb.oid.clone();
                results.push(vb);
            }
            if done {
                break;
            }
        }
        self.cache.put(cache_key, results.clone());
        Ok(results)
    }

    pub async fn test_connection(&self, address: &str, config: &SnmpConfig) -> Result<Duration> {
        let start = std::time::Instant::now();
        self.get(address, config, &["1.3.6.1.2.1.1.1.0".to_string()]).await?;
        Ok(start.elapsed())
    }
}
