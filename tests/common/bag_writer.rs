//! Minimal ROS bag (format 2.0) writer for fixtures
//!
//! Produces an uncompressed bag with a single chunk holding every connection
//! and message, followed by the index section (connections and chunk info).

use std::collections::BTreeMap;
use std::path::Path;

const MAGIC: &[u8] = b"#ROSBAG V2.0\n";
const BAG_HEADER_LEN: usize = 4096;

const OP_MSG_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_CHUNK: u8 = 0x05;
const OP_CHUNK_INFO: u8 = 0x06;
const OP_CONNECTION: u8 = 0x07;

pub const JOINT_STATE_TYPE: &str = "sensor_msgs/JointState";
pub const WRENCH_TYPE: &str = "geometry_msgs/WrenchStamped";
pub const MULTI_ARRAY_TYPE: &str = "std_msgs/Float64MultiArray";
pub const POSE_TYPE: &str = "geometry_msgs/PoseStamped";

/// MD5 of a message definition; readers require 32 lowercase hex digits
fn md5sum(msg_type: &str) -> &'static [u8] {
    match msg_type {
        JOINT_STATE_TYPE => b"3066dcd76a6cfaef579bd0f34173e9fd",
        WRENCH_TYPE => b"d78d3cb249ce23087ade7e7d0c40cfa7",
        MULTI_ARRAY_TYPE => b"4b7d974086d4060e7db4613a7e6c3ba4",
        POSE_TYPE => b"d3812c3cbc69362b77dc0b19b345f8f5",
        _ => b"00000000000000000000000000000000",
    }
}

struct Connection {
    id: u32,
    topic: String,
    msg_type: String,
}

struct Message {
    conn: u32,
    secs: u32,
    nsecs: u32,
    payload: Vec<u8>,
}

/// Accumulates messages and serializes them as a bag file
#[derive(Default)]
pub struct BagWriter {
    connections: Vec<Connection>,
    messages: Vec<Message>,
}

impl BagWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection_id(&mut self, topic: &str, msg_type: &str) -> u32 {
        if let Some(conn) = self.connections.iter().find(|c| c.topic == topic) {
            return conn.id;
        }
        let id = self.connections.len() as u32;
        self.connections.push(Connection {
            id,
            topic: topic.to_string(),
            msg_type: msg_type.to_string(),
        });
        id
    }

    /// Record a message on `topic` at the given record time
    pub fn message(&mut self, topic: &str, msg_type: &str, secs: u32, nsecs: u32, payload: Vec<u8>) -> &mut Self {
        let conn = self.connection_id(topic, msg_type);
        self.messages.push(Message {
            conn,
            secs,
            nsecs,
            payload,
        });
        self
    }

    /// Record a message at a floating point record time
    pub fn message_at(&mut self, topic: &str, msg_type: &str, time: f64, payload: Vec<u8>) -> &mut Self {
        let (secs, nsecs) = split_time(time);
        self.message(topic, msg_type, secs, nsecs, payload)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        let bag_header_pos = out.len();
        out.resize(bag_header_pos + BAG_HEADER_LEN, 0);

        let mut chunk_data = Vec::new();
        for conn in &self.connections {
            write_connection(&mut chunk_data, conn);
        }
        for msg in &self.messages {
            write_record(
                &mut chunk_data,
                &[
                    field("op", &[OP_MSG_DATA]),
                    field("conn", &msg.conn.to_le_bytes()),
                    field("time", &time_bytes(msg.secs, msg.nsecs)),
                ],
                &msg.payload,
            );
        }

        let chunk_pos = out.len() as u64;
        write_record(
            &mut out,
            &[
                field("op", &[OP_CHUNK]),
                field("compression", b"none"),
                field("size", &(chunk_data.len() as u32).to_le_bytes()),
            ],
            &chunk_data,
        );

        let index_pos = out.len() as u64;
        for conn in &self.connections {
            write_connection(&mut out, conn);
        }

        let mut per_conn: BTreeMap<u32, u32> = BTreeMap::new();
        for msg in &self.messages {
            *per_conn.entry(msg.conn).or_default() += 1;
        }
        let start = self.messages.iter().map(|m| (m.secs, m.nsecs)).min().unwrap_or((0, 0));
        let end = self.messages.iter().map(|m| (m.secs, m.nsecs)).max().unwrap_or((0, 0));
        let mut info_data = Vec::new();
        for (conn, count) in &per_conn {
            info_data.extend_from_slice(&conn.to_le_bytes());
            info_data.extend_from_slice(&count.to_le_bytes());
        }
        write_record(
            &mut out,
            &[
                field("op", &[OP_CHUNK_INFO]),
                field("ver", &1u32.to_le_bytes()),
                field("chunk_pos", &chunk_pos.to_le_bytes()),
                field("start_time", &time_bytes(start.0, start.1)),
                field("end_time", &time_bytes(end.0, end.1)),
                field("count", &(per_conn.len() as u32).to_le_bytes()),
            ],
            &info_data,
        );

        // Bag header record, padded to its fixed size
        let header = [
            field("op", &[OP_BAG_HEADER]),
            field("index_pos", &index_pos.to_le_bytes()),
            field("conn_count", &(self.connections.len() as u32).to_le_bytes()),
            field("chunk_count", &1u32.to_le_bytes()),
        ]
        .concat();
        let padding = BAG_HEADER_LEN - 8 - header.len();
        let mut record = Vec::with_capacity(BAG_HEADER_LEN);
        record.extend_from_slice(&(header.len() as u32).to_le_bytes());
        record.extend_from_slice(&header);
        record.extend_from_slice(&(padding as u32).to_le_bytes());
        record.resize(BAG_HEADER_LEN, b' ');
        out[bag_header_pos..bag_header_pos + BAG_HEADER_LEN].copy_from_slice(&record);

        out
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).expect("failed to write bag fixture");
    }
}

fn split_time(time: f64) -> (u32, u32) {
    let secs = time.floor();
    let nsecs = ((time - secs) * 1e9).round() as u32;
    if nsecs >= 1_000_000_000 {
        (secs as u32 + 1, 0)
    } else {
        (secs as u32, nsecs)
    }
}

fn time_bytes(secs: u32, nsecs: u32) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&secs.to_le_bytes());
    bytes[4..].copy_from_slice(&nsecs.to_le_bytes());
    bytes
}

fn field(name: &str, value: &[u8]) -> Vec<u8> {
    let len = name.len() + 1 + value.len();
    let mut buf = Vec::with_capacity(4 + len);
    buf.extend_from_slice(&(len as u32).to_le_bytes());
    buf.extend_from_slice(name.as_bytes());
    buf.push(b'=');
    buf.extend_from_slice(value);
    buf
}

fn write_record(out: &mut Vec<u8>, header: &[Vec<u8>], data: &[u8]) {
    let header = header.concat();
    out.extend_from_slice(&(header.len() as u32).to_le_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
}

fn write_connection(out: &mut Vec<u8>, conn: &Connection) {
    let data = [
        field("topic", conn.topic.as_bytes()),
        field("type", conn.msg_type.as_bytes()),
        field("md5sum", md5sum(&conn.msg_type)),
        field("message_definition", b""),
    ]
    .concat();
    write_record(
        out,
        &[
            field("op", &[OP_CONNECTION]),
            field("conn", &conn.id.to_le_bytes()),
            field("topic", conn.topic.as_bytes()),
        ],
        &data,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_time() {
        assert_eq!(split_time(10.0), (10, 0));
        assert_eq!(split_time(10.05), (10, 50_000_000));
    }

    #[test]
    fn test_md5sum_is_hex_digest() {
        for msg_type in [JOINT_STATE_TYPE, WRENCH_TYPE, MULTI_ARRAY_TYPE, POSE_TYPE, "custom/Type"] {
            let digest = md5sum(msg_type);
            assert_eq!(digest.len(), 32, "{}", msg_type);
            assert!(digest.iter().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b)));
        }
    }

    #[test]
    fn test_layout() {
        let mut bag = BagWriter::new();
        bag.message("/a", WRENCH_TYPE, 1, 0, vec![1, 2, 3]);
        let bytes = bag.to_bytes();
        assert!(bytes.starts_with(MAGIC));
        // First record after the padded bag header is the chunk
        let chunk_header_len =
            u32::from_le_bytes(bytes[MAGIC.len() + BAG_HEADER_LEN..][..4].try_into().unwrap());
        assert!(chunk_header_len > 0);
    }
}
