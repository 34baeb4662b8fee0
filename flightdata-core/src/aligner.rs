//! Frame synchronization for continuous recorder bitstreams
//!
//! [`ByteAligner`] consumes byte chunks of arbitrary size and emits byte
//! buffers realigned to frame boundaries. It runs a two-state machine:
//!
//! * **Unsynced**: every byte offset is a candidate frame start. The 16-bit
//!   word there is masked and looked up in the table of first-subframe sync
//!   words. A hypothesis `(format, wps)` is accepted only when every
//!   subframe sync word of the frame *and* the first sync word of the next
//!   frame are present. Hypotheses are tried from the shortest frame up; if
//!   one needs bytes that have not arrived yet the scan stops and the tail is
//!   carried into the next call.
//! * **Synced**: whole frames are checked subframe by subframe and emitted.
//!   On a mismatch the frame start is first retried against every
//!   hypothesis, which follows a change of rate; failing that, sync is lost.
//!
//! Chunks are appended to a carry-over buffer; only bytes proven not to
//! start an unconfirmed frame are discarded.

use crate::constants::WORD_SIZE;
use crate::error::FlightDataError;
use crate::kernels::read_u16_unchecked;
use crate::types::AlignerConfig;
use crate::Result;
use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use bytes::{Buf, Bytes, BytesMut};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A point in the stream where sync was acquired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPoint {
    /// Absolute byte offset of the first confirmed frame
    pub offset: u64,

    /// Words per subframe of the confirmed format
    pub wps: u16,

    /// Label of the confirmed format
    pub label: String,
}

/// Half-open range `[start, stop)` of output chunk indices to emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameWindow {
    start: u64,
    stop: Option<u64>,
}

impl FrameWindow {
    /// Validate a window. `start < 0`, `stop <= 0` and `stop <= start` are
    /// rejected.
    pub fn new(start: Option<i64>, stop: Option<i64>) -> Result<Self> {
        let start_val = start.unwrap_or(0);
        if start_val < 0 {
            return Err(FlightDataError::InvalidWindow(format!(
                "start must not be negative (got {start_val})"
            )));
        }
        if let Some(stop) = stop {
            if stop <= 0 {
                return Err(FlightDataError::InvalidWindow(format!(
                    "stop must be positive (got {stop})"
                )));
            }
            if stop <= start_val {
                return Err(FlightDataError::InvalidWindow(format!(
                    "stop ({stop}) must be greater than start ({start_val})"
                )));
            }
        }
        Ok(Self {
            start: start_val as u64,
            stop: stop.map(|s| s as u64),
        })
    }

    /// Window covering the whole stream
    pub fn all() -> Self {
        Self::default()
    }

    #[inline]
    fn contains(&self, index: u64) -> bool {
        index >= self.start && !self.is_past(index)
    }

    #[inline]
    fn is_past(&self, index: u64) -> bool {
        self.stop.is_some_and(|stop| index >= stop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hypothesis {
    format: usize,
    wps: u16,
    frame_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Match(Hypothesis),
    Miss,
    Pending,
}

#[derive(Debug)]
enum Event {
    Output { index: u64, data: Bytes },
    Synced(SyncPoint),
}

/// Byte position within a word and candidate values used to jump between
/// possible sync offsets with `memchr`
#[derive(Debug, Clone)]
struct SkipPlan {
    byte: usize,
    needles: Vec<u8>,
}

/// Incremental frame synchronizer for one stream
///
/// Each stream owns its aligner; `reset` prepares it for a new stream.
#[derive(Debug)]
pub struct ByteAligner {
    config: AlignerConfig,
    lead: HashMap<(u16, u16), Vec<Hypothesis>>,
    masks: Vec<u16>,
    skip: Option<SkipPlan>,
    buffer: BytesMut,
    offset: u64,
    synced: Option<Hypothesis>,
    events: VecDeque<Event>,
    frames_emitted: u64,
}

impl ByteAligner {
    /// Create an aligner, validating `config`
    pub fn new(config: AlignerConfig) -> Result<Self> {
        config.validate()?;

        let mut lead: HashMap<(u16, u16), Vec<Hypothesis>> = HashMap::new();
        for (format, wps) in config.hypotheses() {
            let f = &config.formats[format];
            let key = (f.sync_mask, f.sync_words[0] & f.sync_mask);
            lead.entry(key).or_default().push(Hypothesis {
                format,
                wps,
                frame_len: f.frame_len(wps),
            });
        }
        for hypotheses in lead.values_mut() {
            hypotheses.sort_by_key(|h| h.frame_len);
        }

        let mut masks: Vec<u16> = lead.keys().map(|&(mask, _)| mask).collect();
        masks.sort_unstable();
        masks.dedup();

        let skip = skip_plan(lead.keys().copied(), config.little_endian);

        Ok(Self {
            config,
            lead,
            masks,
            skip,
            buffer: BytesMut::new(),
            offset: 0,
            synced: None,
            events: VecDeque::new(),
            frames_emitted: 0,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Absolute stream offset of the first byte still buffered
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes carried over, waiting for more input
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Words per subframe of the current sync, if synced
    pub fn wps(&self) -> Option<u16> {
        self.synced.map(|h| h.wps)
    }

    /// Label of the current sync format, if synced
    pub fn format_label(&self) -> Option<&str> {
        self.synced
            .map(|h| self.config.formats[h.format].label.as_str())
    }

    /// Number of output chunks produced since the last reset
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Return to the initial state for a new stream
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.offset = 0;
        self.synced = None;
        self.events.clear();
        self.frames_emitted = 0;
    }

    /// Feed one chunk and return the aligned buffers it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.feed(chunk, false);
        self.drain_output()
    }

    /// Signal end of stream and return any remaining aligned buffers
    pub fn finish(&mut self) -> Vec<Bytes> {
        self.feed(&[], true);
        self.drain_output()
    }

    /// Align a whole stream of chunks.
    ///
    /// `start`/`stop` select a half-open range of output chunk indices,
    /// counted from this call. Invalid windows are rejected before any
    /// input is read. The end of `chunks` is treated as the end of stream.
    pub fn process<I>(
        &mut self,
        chunks: I,
        start: Option<i64>,
        stop: Option<i64>,
    ) -> Result<Process<'_, I::IntoIter>>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let window = FrameWindow::new(start, stop)?;
        Ok(self.process_window(chunks, window))
    }

    /// [`process`](Self::process) with a pre-validated window.
    ///
    /// Output left queued by an earlier iterator that was dropped before it
    /// finished is discarded.
    pub fn process_window<I>(&mut self, chunks: I, window: FrameWindow) -> Process<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.events.clear();
        let base = self.frames_emitted;
        Process {
            aligner: self,
            chunks: chunks.into_iter(),
            window,
            base,
            exhausted: false,
            stopped: false,
        }
    }

    /// Report every point where sync is acquired, without producing
    /// aligned output.
    pub fn identify<I>(&mut self, chunks: I) -> Identify<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        Identify {
            aligner: self,
            chunks: chunks.into_iter(),
            exhausted: false,
        }
    }

    fn drain_output(&mut self) -> Vec<Bytes> {
        self.events
            .drain(..)
            .filter_map(|event| match event {
                Event::Output { data, .. } => Some(data),
                Event::Synced(_) => None,
            })
            .collect()
    }

    fn feed(&mut self, chunk: &[u8], eof: bool) {
        self.buffer.extend_from_slice(chunk);
        self.scan(eof);
    }

    /// Drop `count` leading bytes of the buffer.
    fn consume(&mut self, count: usize) {
        self.buffer.advance(count);
        self.offset += count as u64;
    }

    /// Emit the first `len` bytes of the buffer as one output chunk.
    fn emit(&mut self, len: usize) {
        let data = self.buffer.split_to(len).freeze();
        self.offset += len as u64;
        self.events.push_back(Event::Output {
            index: self.frames_emitted,
            data,
        });
        self.frames_emitted += 1;
    }

    fn scan(&mut self, eof: bool) {
        loop {
            match self.synced {
                Some(hyp) => {
                    if !self.step_synced(hyp, eof) {
                        break;
                    }
                }
                None => {
                    let pos = self.skip_to_candidate(0);
                    if pos >= self.buffer.len() {
                        self.consume(pos.min(self.buffer.len()));
                        break;
                    }
                    match self.acquire(pos, eof) {
                        Check::Match(hyp) => {
                            self.consume(pos);
                            self.acquired(hyp);
                        }
                        Check::Pending => {
                            self.consume(pos);
                            break;
                        }
                        Check::Miss => self.consume(pos + 1),
                    }
                }
            }
        }
    }

    /// Handle the frame at the front of the buffer while synced. Returns
    /// false when more input is needed.
    fn step_synced(&mut self, hyp: Hypothesis, eof: bool) -> bool {
        let subframes = self.config.formats[hyp.format].subframes();
        let sub_len = hyp.frame_len / subframes;
        let available = self.buffer.len();

        if available < hyp.frame_len {
            if !eof {
                return false;
            }
            let matched = self.matching_subframes(0, hyp, available / sub_len);
            self.emit_partial(matched * sub_len);
            if self.buffer.has_remaining() {
                #[cfg(feature = "logging")]
                debug!(
                    "Dropping {} trailing bytes at offset {}",
                    self.buffer.len(),
                    self.offset
                );
                self.consume(self.buffer.len());
            }
            self.synced = None;
            return false;
        }

        let matched = self.matching_subframes(0, hyp, subframes);
        if matched == subframes {
            self.emit(hyp.frame_len);
            return true;
        }

        // a different rate or format may start right here
        match self.acquire(0, eof) {
            Check::Match(next) => {
                self.acquired(next);
                return true;
            }
            Check::Pending => return false,
            Check::Miss => {
                #[cfg(feature = "logging")]
                warn!(
                    "Lost sync at offset {} (subframe {} of {})",
                    self.offset,
                    matched + 1,
                    subframes
                );
            }
        }
        self.synced = None;
        let partial = matched * sub_len;
        self.emit_partial(partial);
        if partial == 0 {
            self.consume(1);
        }
        true
    }

    /// Enter the synced state for `hyp` at the front of the buffer.
    fn acquired(&mut self, hyp: Hypothesis) {
        self.synced = Some(hyp);
        let label = self.config.formats[hyp.format].label.clone();
        #[cfg(feature = "logging")]
        debug!(
            "Synced format {} at {} wps, offset {}",
            label, hyp.wps, self.offset
        );
        self.events.push_back(Event::Synced(SyncPoint {
            offset: self.offset,
            wps: hyp.wps,
            label,
        }));
    }

    /// Emit `len` bytes of whole subframes unless only whole frames are
    /// wanted, in which case they are dropped.
    fn emit_partial(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if self.config.frames_only {
            #[cfg(feature = "logging")]
            debug!("Dropping partial frame of {} bytes at offset {}", len, self.offset);
            self.consume(len);
        } else {
            self.emit(len);
        }
    }

    /// Count the leading subframes (up to `count`) at `pos` whose sync word
    /// matches. Every subframe start checked must be readable.
    fn matching_subframes(&self, pos: usize, hyp: Hypothesis, count: usize) -> usize {
        let format = &self.config.formats[hyp.format];
        let sub_len = hyp.frame_len / format.subframes();
        debug_assert!(count == 0 || pos + (count - 1) * sub_len + WORD_SIZE <= self.buffer.len());
        format
            .sync_words
            .iter()
            .take(count)
            .enumerate()
            .take_while(|&(k, &sync)| {
                // SAFETY: the caller guarantees subframe `k` starts in bounds
                let word = unsafe {
                    read_u16_unchecked(&self.buffer, pos + k * sub_len, self.config.little_endian)
                };
                word & format.sync_mask == sync & format.sync_mask
            })
            .count()
    }

    /// Try every hypothesis whose first sync word matches the word at `pos`.
    fn acquire(&self, pos: usize, eof: bool) -> Check {
        let buf = &self.buffer[..];
        if pos + WORD_SIZE > buf.len() {
            return if eof { Check::Miss } else { Check::Pending };
        }
        // SAFETY: bounds checked above
        let word = unsafe { read_u16_unchecked(buf, pos, self.config.little_endian) };

        let mut candidates: Vec<Hypothesis> = self
            .masks
            .iter()
            .filter_map(|&mask| self.lead.get(&(mask, word & mask)))
            .flatten()
            .copied()
            .collect();
        if candidates.is_empty() {
            return Check::Miss;
        }
        if self.masks.len() > 1 {
            candidates.sort_by_key(|h| h.frame_len);
        }

        for hyp in candidates {
            match self.check_hypothesis(pos, hyp, eof) {
                Check::Miss => continue,
                other => return other,
            }
        }
        Check::Miss
    }

    /// Check one hypothesis: all subframe sync words of the frame at `pos`
    /// plus the first sync word of the following frame.
    fn check_hypothesis(&self, pos: usize, hyp: Hypothesis, eof: bool) -> Check {
        let format = &self.config.formats[hyp.format];
        let next = pos + hyp.frame_len;
        if next + WORD_SIZE > self.buffer.len() {
            return if eof { Check::Miss } else { Check::Pending };
        }
        if self.matching_subframes(pos, hyp, format.subframes()) != format.subframes() {
            return Check::Miss;
        }
        if self.matching_subframes(next, hyp, 1) != 1 {
            return Check::Miss;
        }
        Check::Match(hyp)
    }

    /// Next buffer offset at or after `from` that may start a sync word.
    ///
    /// Returns a value `>= buffer.len()` when no offset can match.
    fn skip_to_candidate(&self, from: usize) -> usize {
        let Some(plan) = &self.skip else {
            return from;
        };
        let buf = &self.buffer[..];
        let hay_start = from + plan.byte;
        if hay_start >= buf.len() {
            return from;
        }
        let hay = &buf[hay_start..];
        let hit = match plan.needles.as_slice() {
            [a] => memchr::memchr(*a, hay),
            [a, b] => memchr::memchr2(*a, *b, hay),
            [a, b, c] => memchr::memchr3(*a, *b, *c, hay),
            _ => Some(0),
        };
        match hit {
            Some(i) => from + i,
            None => (buf.len() - plan.byte).max(from),
        }
    }
}

/// Work out whether one byte of every first sync word is fully covered by
/// its mask, so candidate offsets can be found with `memchr`.
fn skip_plan(keys: impl Iterator<Item = (u16, u16)> + Clone, little_endian: bool) -> Option<SkipPlan> {
    for byte in 0..WORD_SIZE {
        let mut needles = Vec::new();
        let mut determined = true;
        for (mask, word) in keys.clone() {
            let (mask_bytes, word_bytes) = if little_endian {
                (mask.to_le_bytes(), word.to_le_bytes())
            } else {
                (mask.to_be_bytes(), word.to_be_bytes())
            };
            if mask_bytes[byte] != 0xFF {
                determined = false;
                break;
            }
            needles.push(word_bytes[byte]);
        }
        needles.sort_unstable();
        needles.dedup();
        if determined && !needles.is_empty() && needles.len() <= 3 {
            return Some(SkipPlan { byte, needles });
        }
    }
    None
}

/// Iterator returned by [`ByteAligner::process`]
#[derive(Debug)]
pub struct Process<'a, I> {
    aligner: &'a mut ByteAligner,
    chunks: I,
    window: FrameWindow,
    base: u64,
    exhausted: bool,
    stopped: bool,
}

impl<I> Iterator for Process<'_, I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.stopped {
            return None;
        }
        loop {
            while let Some(event) = self.aligner.events.pop_front() {
                let Event::Output { index, data } = event else {
                    continue;
                };
                let index = index - self.base;
                if self.window.is_past(index) {
                    self.stopped = true;
                    self.aligner.events.clear();
                    return None;
                }
                if self.window.contains(index) {
                    return Some(data);
                }
            }
            if self.exhausted {
                return None;
            }
            match self.chunks.next() {
                Some(chunk) => self.aligner.feed(chunk.as_ref(), false),
                None => {
                    self.aligner.feed(&[], true);
                    self.exhausted = true;
                }
            }
        }
    }
}

/// Iterator returned by [`ByteAligner::identify`]
#[derive(Debug)]
pub struct Identify<'a, I> {
    aligner: &'a mut ByteAligner,
    chunks: I,
    exhausted: bool,
}

impl<I> Iterator for Identify<'_, I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    type Item = SyncPoint;

    fn next(&mut self) -> Option<SyncPoint> {
        loop {
            while let Some(event) = self.aligner.events.pop_front() {
                if let Event::Synced(point) = event {
                    return Some(point);
                }
            }
            if self.exhausted {
                return None;
            }
            match self.chunks.next() {
                Some(chunk) => self.aligner.feed(chunk.as_ref(), false),
                None => {
                    self.aligner.feed(&[], true);
                    self.exhausted = true;
                }
            }
        }
    }
}
