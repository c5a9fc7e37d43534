//! Minimal ASN.1 BER codec for the subset of SNMP PDU and varbind
//! encodings this engine needs: SEQUENCE, INTEGER, OCTET STRING, NULL,
//! OBJECT IDENTIFIER, the application-tagged SMI types
//! (IpAddress/Counter32/Gauge32/TimeTicks/Counter64), the exception
//! values (noSuchObject/noSuchInstance/endOfMibView), and the
//! context-tagged PDU wrappers for get/get-next/get-bulk/set/response.
//!
//! No SNMP crate exists anywhere in the retrieved example pack, so this
//! is hand-rolled rather than borrowed from a teacher file.

use byteorder::{BigEndian, ByteOrder};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

pub const TAG_IP_ADDRESS: u8 = 0x40;
pub const TAG_COUNTER32: u8 = 0x41;
pub const TAG_GAUGE32: u8 = 0x42;
pub const TAG_TIMETICKS: u8 = 0x43;
pub const TAG_OPAQUE: u8 = 0x44;
pub const TAG_COUNTER64: u8 = 0x46;

pub const TAG_NO_SUCH_OBJECT: u8 = 0x80;
pub const TAG_NO_SUCH_INSTANCE: u8 = 0x81;
pub const TAG_END_OF_MIB_VIEW: u8 = 0x82;

pub const PDU_GET_REQUEST: u8 = 0xA0;
pub const PDU_GET_NEXT_REQUEST: u8 = 0xA1;
pub const PDU_RESPONSE: u8 = 0xA2;
pub const PDU_SET_REQUEST: u8 = 0xA3;
pub const PDU_GET_BULK_REQUEST: u8 = 0xA5;

/// The standard SNMP PDU error set (RFC 3416 plus the v1/v2 legacy
/// codes), surfaced verbatim on the response contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SnmpErrorCode {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
}

impl SnmpErrorCode {
    pub fn from_status(status: i64) -> Self {
        match status {
            0 => SnmpErrorCode::NoError,
            1 => SnmpErrorCode::TooBig,
            2 => SnmpErrorCode::NoSuchName,
            3 => SnmpErrorCode::BadValue,
            4 => SnmpErrorCode::ReadOnly,
            5 => SnmpErrorCode::GenErr,
            6 => SnmpErrorCode::NoAccess,
            7 => SnmpErrorCode::WrongType,
            8 => SnmpErrorCode::WrongLength,
            9 => SnmpErrorCode::WrongEncoding,
            10 => SnmpErrorCode::WrongValue,
            11 => SnmpErrorCode::NoCreation,
            12 => SnmpErrorCode::InconsistentValue,
            13 => SnmpErrorCode::ResourceUnavailable,
            14 => SnmpErrorCode::CommitFailed,
            15 => SnmpErrorCode::UndoFailed,
            16 => SnmpErrorCode::AuthorizationError,
            17 => SnmpErrorCode::NotWritable,
            18 => SnmpErrorCode::InconsistentName,
            _ => SnmpErrorCode::GenErr,
        }
    }
}

/// The tagged sum of varbind values this engine can carry over the
/// wire, named directly after the design notes' "dynamic/duck-typed
/// varbind values" re-architecture.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Integer(i64),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    OctetString(Vec<u8>),
    Oid(String),
    IpAddress([u8; 4]),
    Opaque(Vec<u8>),
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl RawValue {
    /// Normalize into the string type tag used on the public response
    /// contract (`varbinds[].type`).
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Integer(_) => "integer",
            RawValue::Counter32(_) => "counter32",
            RawValue::Gauge32(_) => "gauge32",
            RawValue::TimeTicks(_) => "timeticks",
            RawValue::Counter64(_) => "counter64",
            RawValue::OctetString(_) => "octet_string",
            RawValue::Oid(_) => "oid",
            RawValue::IpAddress(_) => "ip_address",
            RawValue::Opaque(_) => "opaque",
            RawValue::Null => "null",
            RawValue::NoSuchObject => "no_such_object",
            RawValue::NoSuchInstance => "no_such_instance",
            RawValue::EndOfMibView => "end_of_mib_view",
        }
    }

    /// Normalize across types the way the response contract requires:
    /// integer/counter32/gauge32/timeticks/unsigned32 -> i64 (lossless),
    /// counter64 -> u64, octet strings/oids -> UTF-8 string, IpAddress
    /// -> dotted-quad string.
    pub fn as_display_string(&self) -> String {
        match self {
            RawValue::Integer(v) => v.to_string(),
            RawValue::Counter32(v) => v.to_string(),
            RawValue::Gauge32(v) => v.to_string(),
            RawValue::TimeTicks(v) => v.to_string(),
            RawValue::Counter64(v) => v.to_string(),
            RawValue::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            RawValue::Oid(s) => s.clone(),
            RawValue::IpAddress(octets) => octets
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join("."),
            RawValue::Opaque(bytes) => hex::encode(bytes),
            RawValue::Null | RawValue::NoSuchObject | RawValue::NoSuchInstance | RawValue::EndOfMibView => {
                String::new()
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(v) => Some(*v),
            RawValue::Counter32(v) | RawValue::Gauge32(v) | RawValue::TimeTicks(v) => Some(*v as i64),
            RawValue::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RawValue::Counter64(v) => Some(*v),
            RawValue::Counter32(v) | RawValue::Gauge32(v) | RawValue::TimeTicks(v) => Some(*v as u64),
            RawValue::Integer(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            RawValue::NoSuchObject | RawValue::NoSuchInstance | RawValue::EndOfMibView
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Varbind {
    pub oid: String,
    pub value: RawValue,
}

#[derive(Debug, Clone)]
pub struct PduHeader {
    pub pdu_type: u8,
    pub request_id: i32,
    pub error_status: i64,
    pub error_index: i64,
    /// non_repeaters for GetBulk, unused otherwise.
    pub non_repeaters: i64,
    /// max_repetitions for GetBulk, unused otherwise.
    pub max_repetitions: i64,
    pub varbinds: Vec<Varbind>,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub version: u8,
    pub community: String,
    pub pdu: PduHeader,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("truncated BER input")]
    Truncated,
    #[error("unsupported tag: {0:#04x}")]
    UnsupportedTag(u8),
    #[error("malformed OID")]
    MalformedOid,
}

type CodecResult<T> = std::result::Result<T, CodecError>;

/// Encode a length in BER short/long form.
fn encode_length(buf: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        buf.push(len as u8);
    } else {
        let mut bytes = Vec::new();
        let mut n = len;
        while n > 0 {
            bytes.push((n & 0xFF) as u8);
            n >>= 8;
        }
        bytes.reverse();
        buf.push(0x80 | bytes.len() as u8);
        buf.extend_from_slice(&bytes);
    }
}

fn encode_tlv(buf: &mut Vec<u8>, tag: u8, content: &[u8]) {
    buf.push(tag);
    encode_length(buf, content.len());
    buf.extend_from_slice(content);
}

fn encode_integer(value: i64) -> Vec<u8> {
    if value == 0 {
        return vec![0];
    }
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.len() > 1 && ((bytes[0] == 0 && bytes[1] & 0x80 == 0) || (bytes[0] == 0xFF && bytes[1] & 0x80 != 0))
    {
        bytes.remove(0);
    }
    bytes
}

fn encode_unsigned(value: u64, tag: u8) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes.remove(0);
    }
    // Unsigned BER integers need a leading zero byte when the high bit
    // of the first octet is set, to keep them from reading as negative.
    if tag != TAG_COUNTER64 && bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    } else if tag == TAG_COUNTER64 && bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

pub fn encode_oid(oid: &str) -> CodecResult<Vec<u8>> {
    let arcs: Vec<u64> = oid
        .trim_start_matches('.')
        .split('.')
        .map(|s| s.parse::<u64>().map_err(|_| CodecError::MalformedOid))
        .collect::<CodecResult<Vec<_>>>()?;
    if arcs.len() < 2 {
        return Err(CodecError::MalformedOid);
    }
    let mut out = vec![(arcs[0] * 40 + arcs[1]) as u8];
    for &arc in &arcs[2..] {
        out.extend(encode_base128(arc));
    }
    Ok(out)
}

fn encode_base128(mut value: u64) -> Vec<u8> {
    let mut stack = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        stack.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    stack.reverse();
    stack
}

fn decode_oid(bytes: &[u8]) -> CodecResult<String> {
    if bytes.is_empty() {
        return Err(CodecError::MalformedOid);
    }
    let first = bytes[0];
    let mut arcs = vec![(first / 40) as u64, (first % 40) as u64];
    let mut value: u64 = 0;
    for &b in &bytes[1..] {
        value = (value << 7) | (b & 0x7F) as u64;
        if b & 0x80 == 0 {
            arcs.push(value);
            value = 0;
        }
    }
    Ok(arcs
        .into_iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("."))
}

fn decode_length(input: &[u8], pos: &mut usize) -> CodecResult<usize> {
    let first = *input.get(*pos).ok_or(CodecError::Truncated)?;
    *pos += 1;
    if first & 0x80 == 0 {
        Ok(first as usize)
    } else {
        let n = (first & 0x7F) as usize;
        if input.len() < *pos + n {
            return Err(CodecError::Truncated);
        }
        let len = BigEndian::read_uint(&input[*pos..*pos + n], n) as usize;
        *pos += n;
        Ok(len)
    }
}

fn decode_tlv<'a>(input: &'a [u8], pos: &mut usize) -> CodecResult<(u8, &'a [u8])> {
    let tag = *input.get(*pos).ok_or(CodecError::Truncated)?;
    *pos += 1;
    let len = decode_length(input, pos)?;
    if input.len() < *pos + len {
        return Err(CodecError::Truncated);
    }
    let content = &input[*pos..*pos + len];
    *pos += len;
    Ok((tag, content))
}

fn decode_integer(content: &[u8]) -> i64 {
    if content.is_empty() {
        return 0;
    }
    let mut value: i64 = if content[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in content {
        value = (value << 8) | b as i64;
    }
    value
}

fn decode_unsigned(content: &[u8]) -> u64 {
    let mut value: u64 = 0;
    for &b in content {
        value = (value << 8) | b as u64;
    }
    value
}

fn decode_value(tag: u8, content: &[u8]) -> CodecResult<RawValue> {
    Ok(match tag {
        TAG_INTEGER => RawValue::Integer(decode_integer(content)),
        TAG_OCTET_STRING => RawValue::OctetString(content.to_vec()),
        TAG_NULL => RawValue::Null,
        TAG_OID => RawValue::Oid(decode_oid(content)?),
        TAG_IP_ADDRESS => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(&content[..4.min(content.len())]);
            RawValue::IpAddress(octets)
        }
        TAG_COUNTER32 => RawValue::Counter32(decode_unsigned(content) as u32),
        TAG_GAUGE32 => RawValue::Gauge32(decode_unsigned(content) as u32),
        TAG_TIMETICKS => RawValue::TimeTicks(decode_unsigned(content) as u32),
        TAG_COUNTER64 => RawValue::Counter64(decode_unsigned(content)),
        TAG_OPAQUE => RawValue::Opaque(content.to_vec()),
        TAG_NO_SUCH_OBJECT => RawValue::NoSuchObject,
        TAG_NO_SUCH_INSTANCE => RawValue::NoSuchInstance,
        TAG_END_OF_MIB_VIEW => RawValue::EndOfMibView,
        other => return Err(CodecError::UnsupportedTag(other)),
    })
}

fn encode_value(buf: &mut Vec<u8>, value: &RawValue) -> CodecResult<()> {
    match value {
        RawValue::Integer(v) => encode_tlv(buf, TAG_INTEGER, &encode_integer(*v)),
        RawValue::Counter32(v) => encode_tlv(buf, TAG_COUNTER32, &encode_unsigned(*v as u64, TAG_COUNTER32)),
        RawValue::Gauge32(v) => encode_tlv(buf, TAG_GAUGE32, &encode_unsigned(*v as u64, TAG_GAUGE32)),
        RawValue::TimeTicks(v) => encode_tlv(buf, TAG_TIMETICKS, &encode_unsigned(*v as u64, TAG_TIMETICKS)),
        RawValue::Counter64(v) => encode_tlv(buf, TAG_COUNTER64, &encode_unsigned(*v, TAG_COUNTER64)),
        RawValue::OctetString(bytes) => encode_tlv(buf, TAG_OCTET_STRING, bytes),
        RawValue::Oid(oid) => encode_tlv(buf, TAG_OID, &encode_oid(oid)?),
        RawValue::IpAddress(octets) => encode_tlv(buf, TAG_IP_ADDRESS, octets),
        RawValue::Opaque(bytes) => encode_tlv(buf, TAG_OPAQUE, bytes),
        RawValue::Null => encode_tlv(buf, TAG_NULL, &[]),
        RawValue::NoSuchObject => encode_tlv(buf, TAG_NO_SUCH_OBJECT, &[]),
        RawValue::NoSuchInstance => encode_tlv(buf, TAG_NO_SUCH_INSTANCE, &[]),
        RawValue::EndOfMibView => encode_tlv(buf, TAG_END_OF_MIB_VIEW, &[]),
    }
    Ok(())
}

fn encode_varbind(buf: &mut Vec<u8>, vb: &Varbind) -> CodecResult<()> {
    let mut content = Vec::new();
    encode_tlv(&mut content, TAG_OID, &encode_oid(&vb.oid)?);
    encode_value(&mut content, &vb.value)?;
    encode_tlv(buf, TAG_SEQUENCE, &content);
    Ok(())
}

fn decode_varbind(content: &[u8]) -> CodecResult<Varbind> {
    let mut pos = 0;
    let (oid_tag, oid_content) = decode_tlv(content, &mut pos)?;
    if oid_tag != TAG_OID {
        return Err(CodecError::UnsupportedTag(oid_tag));
    }
    let oid = decode_oid(oid_content)?;
    let (val_tag, val_content) = decode_tlv(content, &mut pos)?;
    let value = decode_value(val_tag, val_content)?;
    Ok(Varbind { oid, value })
}

/// Encode a full SNMPv1/v2c message with the given PDU.
pub fn encode_message(msg: &Message) -> CodecResult<Vec<u8>> {
    let mut pdu_body = Vec::new();
    encode_tlv(&mut pdu_body, TAG_INTEGER, &encode_integer(msg.pdu.request_id as i64));
    if msg.pdu.pdu_type == PDU_GET_BULK_REQUEST {
        encode_tlv(&mut pdu_body, TAG_INTEGER, &encode_integer(msg.pdu.non_repeaters));
        encode_tlv(&mut pdu_body, TAG_INTEGER, &encode_integer(msg.pdu.max_repetitions));
    } else {
        encode_tlv(&mut pdu_body, TAG_INTEGER, &encode_integer(msg.pdu.error_status));
        encode_tlv(&mut pdu_body, TAG_INTEGER, &encode_integer(msg.pdu.error_index));
    }
    let mut varbinds_content = Vec::new();
    for vb in &msg.pdu.varbinds {
        encode_varbind(&mut varbinds_content, vb)?;
    }
    encode_tlv(&mut pdu_body, TAG_SEQUENCE, &varbinds_content);

    let mut pdu_bytes = Vec::new();
    encode_tlv(&mut pdu_bytes, msg.pdu.pdu_type, &pdu_body);

    let mut message_body = Vec::new();
    encode_tlv(&mut message_body, TAG_INTEGER, &encode_integer(msg.version as i64));
    encode_tlv(&mut message_body, TAG_OCTET_STRING, msg.community.as_bytes());
    message_body.extend_from_slice(&pdu_bytes);

    let mut out = Vec::new();
    encode_tlv(&mut out, TAG_SEQUENCE, &message_body);
    Ok(out)
}

/// Decode a full SNMPv1/v2c message.
pub fn decode_message(input: &[u8]) -> CodecResult<Message> {
    let mut pos = 0;
    let (tag, content) = decode_tlv(input, &mut pos)?;
    if tag != TAG_SEQUENCE {
        return Err(CodecError::UnsupportedTag(tag));
    }

    let mut inner_pos = 0;
    let (ver_tag, ver_content) = decode_tlv(content, &mut inner_pos)?;
    if ver_tag != TAG_INTEGER {
        return Err(CodecError::UnsupportedTag(ver_tag));
    }
    let version = decode_integer(ver_content) as u8;

    let (comm_tag, comm_content) = decode_tlv(content, &mut inner_pos)?;
    if comm_tag != TAG_OCTET_STRING {
        return Err(CodecError::UnsupportedTag(comm_tag));
    }
    let community = String::from_utf8_lossy(comm_content).into_owned();

    let (pdu_type, pdu_content) = decode_tlv(content, &mut inner_pos)?;

    let mut pdu_pos = 0;
    let (_, req_id_content) = decode_tlv(pdu_content, &mut pdu_pos)?;
    let request_id = decode_integer(req_id_content) as i32;

    let (_, second_content) = decode_tlv(pdu_content, &mut pdu_pos)?;
    let second = decode_integer(second_content);
    let (_, third_content) = decode_tlv(pdu_content, &mut pdu_pos)?;
    let third = decode_integer(third_content);

    let (vb_tag, vb_content) = decode_tlv(pdu_content, &mut pdu_pos)?;
    if vb_tag != TAG_SEQUENCE {
        return Err(CodecError::UnsupportedTag(vb_tag));
    }
    let mut varbinds = Vec::new();
    let mut vb_pos = 0;
    while vb_pos < vb_content.len() {
        let (entry_tag, entry_content) = decode_tlv(vb_content, &mut vb_pos)?;
        if entry_tag != TAG_SEQUENCE {
            return Err(CodecError::UnsupportedTag(entry_tag));
        }
        varbinds.push(decode_varbind(entry_content)?);
    }

    let (error_status, error_index, non_repeaters, max_repetitions) = if pdu_type == PDU_GET_BULK_REQUEST {
        (0, 0, second, third)
    } else {
        (second, third, 0, 0)
    };

    Ok(Message {
        version,
        community,
        pdu: PduHeader {
            pdu_type,
            request_id,
            error_status,
            error_index,
            non_repeaters,
            max_repetitions,
            varbinds,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_get_request() {
        let msg = Message {
            version: 1,
            community: "public".to_string(),
            pdu: PduHeader {
                pdu_type: PDU_GET_REQUEST,
                request_id: 42,
                error_status: 0,
                error_index: 0,
                non_repeaters: 0,
                max_repetitions: 0,
                varbinds: vec![Varbind {
                    oid: "1.3.6.1.2.1.1.1.0".to_string(),
                    value: RawValue::Null,
                }],
            },
        };
        let encoded = encode_message(&msg).unwrap();
        let decoded = decode_message(&encoded).unwrap();
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.community, "public");
        assert_eq!(decoded.pdu.request_id, 42);
        assert_eq!(decoded.pdu.varbinds[0].oid, "1.3.6.1.2.1.1.1.0");
    }

    #[test]
    fn round_trips_counter64_and_bulk_params() {
        let msg = Message {
            version: 1,
            community: "public".to_string(),
            pdu: PduHeader {
                pdu_type: PDU_GET_BULK_REQUEST,
                request_id: 7,
                error_status: 0,
                error_index: 0,
                non_repeaters: 1,
                max_repetitions: 20,
                varbinds: vec![Varbind {
                    oid: "1.3.6.1.2.1.31.1.1.1.6.1".to_string(),
                    value: RawValue::Counter64(18_446_744_073_709_551_615),
                }],
            },
        };
        let encoded = encode_message(&msg).unwrap();
        let decoded = decode_message(&encoded).unwrap();
        assert_eq!(decoded.pdu.non_repeaters, 1);
        assert_eq!(decoded.pdu.max_repetitions, 20);
        assert_eq!(
            decoded.pdu.varbinds[0].value,
            RawValue::Counter64(18_446_744_073_709_551_615)
        );
    }

    #[test]
    fn oid_round_trip() {
        let encoded = encode_oid("1.3.6.1.4.1.9.1.1").unwrap();
        let decoded = decode_oid(&encoded).unwrap();
        assert_eq!(decoded, "1.3.6.1.4.1.9.1.1");
    }

    #[test]
    fn exception_values_decode() {
        let content = [];
        assert_eq!(decode_value(TAG_NO_SUCH_OBJECT, &content).unwrap(), RawValue::NoSuchObject);
        assert_eq!(
            decode_value(TAG_NO_SUCH_INSTANCE, &content).unwrap(),
            RawValue::NoSuchInstance
        );
        assert_eq!(decode_value(TAG_END_OF_MIB_VIEW, &content).unwrap(), RawValue::EndOfMibView);
    }
}
