//! Radio command handling
//!
//! The controller is the only writer of the staging buffer. It turns
//! decoded radio commands into effects on the staging buffer, the durable
//! store, the dance status register and the dance clock, and answers each
//! command with exactly one final reply.
//!
//! An accepted export is followed by a sequence of chunk replies built from
//! the refilled staging buffer; the caller drains them with
//! [`DanceController::export_chunks`] before sending the final reply.

use pirouette_protocol::messages::{COLORS_PER_CHUNK, MOVES_PER_CHUNK};
use pirouette_protocol::{NackReason, Packet, RadioCommand, RobotReply, StatusReport};

use heapless::Vec;

use crate::clock::DanceClock;
use crate::gate::DanceStatus;
use crate::staging::StagingBuffer;
use crate::store::{CommitError, DurableStore};
use crate::traits::flash::{FlashError, FlashRegion};

/// Command handler owning the staging buffer
#[derive(Debug, Default)]
pub struct DanceController {
    staging: StagingBuffer,
    export_pending: bool,
}

impl DanceController {
    pub const fn new() -> Self {
        Self {
            staging: StagingBuffer::new(),
            export_pending: false,
        }
    }

    /// Staged records not yet committed
    pub fn staging(&self) -> &StagingBuffer {
        &self.staging
    }

    /// Parse and handle one packet
    ///
    /// Packets that do not decode as a command are refused as malformed.
    pub fn handle_packet<R: FlashRegion>(
        &mut self,
        packet: &Packet,
        store: &mut DurableStore<R>,
        status: &DanceStatus,
        clock: &mut DanceClock,
        now_ms: u64,
    ) -> RobotReply {
        match RadioCommand::from_packet(packet) {
            Ok(command) => self.handle(command, store, status, clock, now_ms),
            Err(_) => RobotReply::Nack {
                command: packet.msg_type,
                reason: NackReason::Malformed,
            },
        }
    }

    /// Handle one command and produce its final reply
    pub fn handle<R: FlashRegion>(
        &mut self,
        command: RadioCommand<'_>,
        store: &mut DurableStore<R>,
        status: &DanceStatus,
        clock: &mut DanceClock,
        now_ms: u64,
    ) -> RobotReply {
        let id = command.msg_type();
        let ack = RobotReply::Ack { command: id };
        let nack = |reason| RobotReply::Nack {
            command: id,
            reason,
        };

        match command {
            RadioCommand::StoreMoves { count, records } => {
                match self.staging.append_moves(records, count as usize) {
                    Ok(_) => ack,
                    Err(_) => nack(NackReason::Capacity),
                }
            }
            RadioCommand::StoreColors { count, records } => {
                match self.staging.append_colors(records, count as usize) {
                    Ok(_) => ack,
                    Err(_) => nack(NackReason::Capacity),
                }
            }
            RadioCommand::ClearStaging => {
                self.staging.reset(status);
                ack
            }
            RadioCommand::Commit => match store.commit(&mut self.staging) {
                Ok(()) => {
                    status.record_commit(true);
                    ack
                }
                Err(error) => {
                    status.record_commit(false);
                    nack(commit_reason(&error))
                }
            },
            RadioCommand::Export => match store.export(&mut self.staging) {
                Ok(()) => {
                    self.export_pending = true;
                    ack
                }
                Err(error) => nack(flash_reason(error)),
            },
            RadioCommand::SetDanceEnabled(enabled) => {
                status.set_dance_enabled(enabled);
                ack
            }
            RadioCommand::SyncClock { date } => {
                clock.sync(date, now_ms);
                ack
            }
            RadioCommand::StatusRequest => RobotReply::Status(self.status_report(store, status)),
        }
    }

    /// Snapshot of the status register and both record counts
    pub fn status_report<R: FlashRegion>(
        &self,
        store: &DurableStore<R>,
        status: &DanceStatus,
    ) -> StatusReport {
        let stored = store.choreography();
        StatusReport {
            flags: status.flags(),
            status: status.status(),
            staged_moves: self.staging.moves().len() as u8,
            staged_colors: self.staging.colors().len() as u8,
            stored_moves: stored.moves.len() as u8,
            stored_colors: stored.colors.len() as u8,
        }
    }

    /// Chunk replies for the last accepted export
    ///
    /// Yields nothing unless an export was accepted since the previous call.
    pub fn export_chunks(&mut self) -> ExportChunks<'_> {
        let active = core::mem::take(&mut self.export_pending);
        ExportChunks {
            staging: &self.staging,
            next_move: 0,
            next_color: 0,
            active,
        }
    }
}

/// Refusal for a packet that could not be queued for handling
pub fn busy_reply(packet: &Packet) -> RobotReply {
    RobotReply::Nack {
        command: packet.msg_type,
        reason: NackReason::Busy,
    }
}

fn flash_reason(error: FlashError) -> NackReason {
    if error.is_retryable() {
        NackReason::CommitRetryable
    } else {
        NackReason::CommitFatal
    }
}

fn commit_reason(error: &CommitError) -> NackReason {
    flash_reason(error.source)
}

/// Export chunk sequence: all waypoint chunks, then all color chunks
pub struct ExportChunks<'a> {
    staging: &'a StagingBuffer,
    next_move: usize,
    next_color: usize,
    active: bool,
}

impl Iterator for ExportChunks<'_> {
    type Item = RobotReply;

    fn next(&mut self) -> Option<RobotReply> {
        if !self.active {
            return None;
        }

        let moves = self.staging.moves();
        if self.next_move < moves.len() {
            let offset = self.next_move;
            let end = (offset + MOVES_PER_CHUNK).min(moves.len());
            self.next_move = end;
            return Some(RobotReply::MovesChunk {
                offset: offset as u8,
                moves: Vec::from_slice(&moves[offset..end]).ok()?,
            });
        }

        let colors = self.staging.colors();
        if self.next_color < colors.len() {
            let offset = self.next_color;
            let end = (offset + COLORS_PER_CHUNK).min(colors.len());
            self.next_color = end;
            return Some(RobotReply::ColorsChunk {
                offset: offset as u8,
                colors: Vec::from_slice(&colors[offset..end]).ok()?,
            });
        }

        self.active = false;
        None
    }
}
