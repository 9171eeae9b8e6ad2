//! Test data builders for channels, sessions and ROS1 payloads

use dvrk_align::{Channel, ChannelKind, Session};
use ndarray::Array2;

/// Builder for synthetic channels
pub struct ChannelBuilder {
    kind: ChannelKind,
    timestamps: Vec<f64>,
    width: usize,
    rows: Vec<Vec<f64>>,
}

impl ChannelBuilder {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            timestamps: Vec::new(),
            width: kind.default_width(),
            rows: Vec::new(),
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Add a sample with explicit values
    pub fn sample(mut self, timestamp: f64, values: &[f64]) -> Self {
        self.timestamps.push(timestamp);
        self.rows.push(values.to_vec());
        self
    }

    /// Add samples whose values are `column + 100 * timestamp` for every column
    pub fn ramp(mut self, timestamps: &[f64]) -> Self {
        for &t in timestamps {
            let row = (0..self.width).map(|c| c as f64 + 100.0 * t).collect();
            self.timestamps.push(t);
            self.rows.push(row);
        }
        self
    }

    pub fn build(self) -> Channel {
        let width = self.rows.first().map_or(self.width, Vec::len);
        let flat: Vec<f64> = self.rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((self.timestamps.len(), width), flat)
            .expect("rows must share a width");
        Channel::new(self.kind, self.kind.name(), self.timestamps, values)
            .expect("timestamps and rows must match")
    }
}

/// Session from a list of channels
pub fn session(name: &str, channels: Vec<Channel>) -> Session {
    channels
        .into_iter()
        .fold(Session::new(name), |session, channel| session.with_channel(channel))
}

/// ROS1 little-endian message encoders
pub mod ros1 {
    fn put_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_f64(buf: &mut Vec<u8>, v: f64) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_string(buf: &mut Vec<u8>, s: &str) {
        put_u32(buf, s.len() as u32);
        buf.extend_from_slice(s.as_bytes());
    }

    fn put_f64_array(buf: &mut Vec<u8>, values: &[f64]) {
        put_u32(buf, values.len() as u32);
        values.iter().for_each(|v| put_f64(buf, *v));
    }

    fn put_header(buf: &mut Vec<u8>, seq: u32, stamp: (u32, u32), frame: &str) {
        put_u32(buf, seq);
        put_u32(buf, stamp.0);
        put_u32(buf, stamp.1);
        put_string(buf, frame);
    }

    /// `sensor_msgs/JointState`
    pub fn joint_state(stamp: (u32, u32), position: &[f64], velocity: &[f64], effort: &[f64]) -> Vec<u8> {
        let mut buf = Vec::new();
        put_header(&mut buf, 0, stamp, "");
        put_u32(&mut buf, position.len() as u32);
        for i in 0..position.len() {
            put_string(&mut buf, &format!("joint_{}", i));
        }
        put_f64_array(&mut buf, position);
        put_f64_array(&mut buf, velocity);
        put_f64_array(&mut buf, effort);
        buf
    }

    /// `geometry_msgs/WrenchStamped`
    pub fn wrench(stamp: (u32, u32), force: [f64; 3], torque: [f64; 3]) -> Vec<u8> {
        let mut buf = Vec::new();
        put_header(&mut buf, 0, stamp, "ft_sensor");
        force.iter().chain(torque.iter()).for_each(|v| put_f64(&mut buf, *v));
        buf
    }

    /// `std_msgs/Float64MultiArray` with a rows × cols layout
    pub fn jacobian(rows: usize, cols: usize, data: &[f64]) -> Vec<u8> {
        let mut buf = Vec::new();
        put_u32(&mut buf, 2);
        put_string(&mut buf, "rows");
        put_u32(&mut buf, rows as u32);
        put_u32(&mut buf, (rows * cols) as u32);
        put_string(&mut buf, "cols");
        put_u32(&mut buf, cols as u32);
        put_u32(&mut buf, cols as u32);
        put_u32(&mut buf, 0);
        put_f64_array(&mut buf, data);
        buf
    }

    /// `geometry_msgs/PoseStamped`
    pub fn pose(stamp: (u32, u32), position: [f64; 3]) -> Vec<u8> {
        let mut buf = Vec::new();
        put_header(&mut buf, 0, stamp, "world");
        position.iter().for_each(|v| put_f64(&mut buf, *v));
        [0.0, 0.0, 0.0, 1.0].iter().for_each(|v| put_f64(&mut buf, *v));
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_builder() {
        let channel = ChannelBuilder::new(ChannelKind::Wrench)
            .ramp(&[0.0, 0.5])
            .build();

        assert_eq!(channel.len(), 2);
        assert_eq!(channel.width(), 3);
        assert_eq!(channel.values()[[1, 2]], 52.0);
    }
}
