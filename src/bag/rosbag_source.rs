//! ROS bag backed message source

use super::{MessageSource, RawMessage, SourceOpener};
use crate::error::{AlignError, Result};
use rosbag::{ChunkRecord, IndexRecord, MessageRecord, RosBag};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads messages from a ROS bag (format 2.0) file
pub struct RosbagSource {
    path: PathBuf,
    bag: RosBag,
}

impl RosbagSource {
    /// Open a bag file
    ///
    /// Fails with [`AlignError::ChannelRead`] if the file is missing or is
    /// not a bag.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bag = RosBag::new(&path).map_err(|e| read_error(&path, e))?;
        Ok(Self { path, bag })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection id → topic, from the index section
    fn indexed_connections(&self) -> Result<HashMap<u32, String>> {
        let mut topics = HashMap::new();
        for record in self.bag.index_records() {
            if let IndexRecord::Connection(conn) = record.map_err(|e| read_error(&self.path, e))? {
                topics.insert(conn.id, conn.topic.to_string());
            }
        }
        Ok(topics)
    }
}

impl MessageSource for RosbagSource {
    fn describe(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn read_messages(&mut self, topics: &[String]) -> Result<Vec<RawMessage>> {
        // Connections may also be declared inside chunks before first use
        let mut connections = self.indexed_connections()?;
        let mut messages = Vec::new();

        for record in self.bag.chunk_records() {
            let ChunkRecord::Chunk(chunk) = record.map_err(|e| read_error(&self.path, e))? else {
                continue;
            };

            for message in chunk.messages() {
                match message.map_err(|e| read_error(&self.path, e))? {
                    MessageRecord::Connection(conn) => {
                        connections
                            .entry(conn.id)
                            .or_insert_with(|| conn.topic.to_string());
                    }
                    MessageRecord::MessageData(data) => {
                        let Some(topic) = connections.get(&data.conn_id) else {
                            tracing::trace!(
                                "{}: message on unknown connection {}",
                                self.describe(),
                                data.conn_id
                            );
                            continue;
                        };
                        if !topics.iter().any(|t| t == topic) {
                            continue;
                        }
                        messages.push(RawMessage::from_nanos(
                            topic.clone(),
                            data.time,
                            data.data.to_vec(),
                        ));
                    }
                }
            }
        }

        Ok(messages)
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> AlignError {
    AlignError::ChannelRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Opens session files as [`RosbagSource`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct RosbagOpener;

impl SourceOpener for RosbagOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn MessageSource>> {
        Ok(Box::new(RosbagSource::open(path)?))
    }
}
