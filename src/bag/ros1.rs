//! ROS1 message decoding
//!
//! Decodes the serialized payloads of the message types recorded by the
//! dVRK and the ATI force sensor, and projects each onto the value vector of
//! its channel:
//!
//! | Channel     | Message type                 | Projection                         |
//! |-------------|------------------------------|------------------------------------|
//! | joint state | `sensor_msgs/JointState`     | position ++ velocity ++ effort     |
//! | wrench      | `geometry_msgs/WrenchStamped`| force x, y, z                      |
//! | Jacobian    | `std_msgs/Float64MultiArray` | data, row-major                    |
//! | Cartesian   | `geometry_msgs/PoseStamped`  | position x, y, z                   |
//!
//! ROS1 serialization is little-endian; variable-length arrays and strings
//! are prefixed with a `u32` element count.

use crate::error::{AlignError, Result};
use crate::types::ChannelKind;

/// `std_msgs/Header`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub seq: u32,
    pub secs: u32,
    pub nsecs: u32,
}

/// A decoded message projected onto its channel's value vector
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    /// Header stamp, for message types that carry a header
    pub stamp: Option<(u32, u32)>,
    /// Projected values
    pub values: Vec<f64>,
}

/// Cursor over a ROS1-serialized payload
pub struct Ros1Reader<'a> {
    topic: &'a str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Ros1Reader<'a> {
    /// Create a reader; `topic` is only used for error messages
    pub fn new(topic: &'a str, buf: &'a [u8]) -> Self {
        Self { topic, buf, pos: 0 }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(AlignError::decode(
                self.topic,
                format!(
                    "payload truncated: need {} bytes at offset {}, {} left",
                    n,
                    self.pos,
                    self.remaining()
                ),
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }

    /// Read a length-prefixed string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AlignError::decode(self.topic, format!("invalid UTF-8 string: {}", e)))
    }

    /// Read a length-prefixed array of strings
    pub fn read_string_array(&mut self) -> Result<Vec<String>> {
        let count = self.read_u32()? as usize;
        (0..count).map(|_| self.read_string()).collect()
    }

    /// Read a length-prefixed `float64[]`
    pub fn read_f64_array(&mut self) -> Result<Vec<f64>> {
        let count = self.read_u32()? as usize;
        if self.remaining() < count.saturating_mul(8) {
            return Err(AlignError::decode(
                self.topic,
                format!("float64[{}] exceeds remaining {} bytes", count, self.remaining()),
            ));
        }
        (0..count).map(|_| self.read_f64()).collect()
    }

    /// Read a fixed-size group of `float64` fields
    pub fn read_f64_fixed<const N: usize>(&mut self) -> Result<[f64; N]> {
        let mut out = [0.0; N];
        for value in out.iter_mut() {
            *value = self.read_f64()?;
        }
        Ok(out)
    }

    /// Read a `std_msgs/Header`
    pub fn read_header(&mut self) -> Result<Header> {
        let seq = self.read_u32()?;
        let secs = self.read_u32()?;
        let nsecs = self.read_u32()?;
        let _frame_id = self.read_string()?;
        Ok(Header { seq, secs, nsecs })
    }
}

/// Decode a payload recorded on `topic` as the message type of `kind`
pub fn decode(kind: ChannelKind, topic: &str, payload: &[u8]) -> Result<DecodedSample> {
    let mut reader = Ros1Reader::new(topic, payload);
    match kind {
        ChannelKind::JointState => decode_joint_state(&mut reader),
        ChannelKind::Wrench => decode_wrench_stamped(&mut reader),
        ChannelKind::Jacobian => decode_float64_multi_array(&mut reader),
        ChannelKind::Cartesian => decode_pose_stamped(&mut reader),
    }
}

/// `sensor_msgs/JointState` → position, velocity, effort concatenated
fn decode_joint_state(reader: &mut Ros1Reader<'_>) -> Result<DecodedSample> {
    let header = reader.read_header()?;
    let _names = reader.read_string_array()?;
    let position = reader.read_f64_array()?;
    let velocity = reader.read_f64_array()?;
    let effort = reader.read_f64_array()?;

    let mut values = Vec::with_capacity(position.len() + velocity.len() + effort.len());
    values.extend(position);
    values.extend(velocity);
    values.extend(effort);

    Ok(DecodedSample {
        stamp: Some((header.secs, header.nsecs)),
        values,
    })
}

/// `geometry_msgs/WrenchStamped` → force x, y, z
fn decode_wrench_stamped(reader: &mut Ros1Reader<'_>) -> Result<DecodedSample> {
    let header = reader.read_header()?;
    let force = reader.read_f64_fixed::<3>()?;
    let _torque = reader.read_f64_fixed::<3>()?;

    Ok(DecodedSample {
        stamp: Some((header.secs, header.nsecs)),
        values: force.to_vec(),
    })
}

/// `std_msgs/Float64MultiArray` → data after `data_offset`, row-major
fn decode_float64_multi_array(reader: &mut Ros1Reader<'_>) -> Result<DecodedSample> {
    let dims = reader.read_u32()?;
    for _ in 0..dims {
        let _label = reader.read_string()?;
        let _size = reader.read_u32()?;
        let _stride = reader.read_u32()?;
    }
    let data_offset = reader.read_u32()? as usize;
    let mut data = reader.read_f64_array()?;

    if data_offset > data.len() {
        return Err(AlignError::decode(
            reader.topic,
            format!("data_offset {} beyond {} elements", data_offset, data.len()),
        ));
    }
    data.drain(..data_offset);

    Ok(DecodedSample {
        stamp: None,
        values: data,
    })
}

/// `geometry_msgs/PoseStamped` → position x, y, z
fn decode_pose_stamped(reader: &mut Ros1Reader<'_>) -> Result<DecodedSample> {
    let header = reader.read_header()?;
    let position = reader.read_f64_fixed::<3>()?;
    let _orientation = reader.read_f64_fixed::<4>()?;

    Ok(DecodedSample {
        stamp: Some((header.secs, header.nsecs)),
        values: position.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_f64s(buf: &mut Vec<u8>, values: &[f64]) {
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn put_string(buf: &mut Vec<u8>, s: &str) {
        put_u32(buf, s.len() as u32);
        buf.extend_from_slice(s.as_bytes());
    }

    fn put_header(buf: &mut Vec<u8>, secs: u32, nsecs: u32) {
        put_u32(buf, 7);
        put_u32(buf, secs);
        put_u32(buf, nsecs);
        put_string(buf, "base");
    }

    #[test]
    fn test_decode_joint_state() {
        let mut buf = Vec::new();
        put_header(&mut buf, 12, 34);
        put_u32(&mut buf, 2);
        put_string(&mut buf, "outer_yaw");
        put_string(&mut buf, "outer_pitch");
        for field in [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]] {
            put_u32(&mut buf, 2);
            put_f64s(&mut buf, &field);
        }

        let sample = decode(ChannelKind::JointState, "/joints", &buf).unwrap();
        assert_eq!(sample.stamp, Some((12, 34)));
        assert_eq!(sample.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_decode_wrench_keeps_force_only() {
        let mut buf = Vec::new();
        put_header(&mut buf, 1, 2);
        put_f64s(&mut buf, &[0.1, 0.2, 0.3, 9.0, 9.0, 9.0]);

        let sample = decode(ChannelKind::Wrench, "/wrench", &buf).unwrap();
        assert_eq!(sample.values, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_decode_multi_array_honors_offset() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 2);
        put_string(&mut buf, "rows");
        put_u32(&mut buf, 2);
        put_u32(&mut buf, 4);
        put_string(&mut buf, "cols");
        put_u32(&mut buf, 2);
        put_u32(&mut buf, 2);
        put_u32(&mut buf, 1);
        put_u32(&mut buf, 5);
        put_f64s(&mut buf, &[-1.0, 1.0, 2.0, 3.0, 4.0]);

        let sample = decode(ChannelKind::Jacobian, "/jacobian", &buf).unwrap();
        assert_eq!(sample.stamp, None);
        assert_eq!(sample.values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_decode_pose_position() {
        let mut buf = Vec::new();
        put_header(&mut buf, 5, 0);
        put_f64s(&mut buf, &[0.01, 0.02, -0.1, 0.0, 0.0, 0.0, 1.0]);

        let sample = decode(ChannelKind::Cartesian, "/pose", &buf).unwrap();
        assert_eq!(sample.stamp, Some((5, 0)));
        assert_eq!(sample.values, vec![0.01, 0.02, -0.1]);
    }

    #[test]
    fn test_truncated_payload_is_decode_error() {
        let mut buf = Vec::new();
        put_header(&mut buf, 1, 2);
        put_f64s(&mut buf, &[0.1, 0.2]);

        let err = decode(ChannelKind::Wrench, "/wrench", &buf).unwrap_err();
        assert!(matches!(err, AlignError::Decode { ref topic, .. } if topic == "/wrench"));
    }

    #[test]
    fn test_oversized_array_count_rejected() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 0);
        put_u32(&mut buf, 0);
        put_u32(&mut buf, u32::MAX);

        assert!(decode(ChannelKind::Jacobian, "/jacobian", &buf).is_err());
    }
}
