//! Command frames for the serial audio module.
//!
//! Every frame is `AA <opcode> <len> <payload..> <checksum>`, where the checksum is the
//! 8-bit wrapping sum of all bytes before it. Nothing is ever read back from the module.

const HEADER: u8 = 0xAA;
const OP_PLAY: u8 = 0x07;
const OP_STOP: u8 = 0x04;
const OP_SET_VOLUME: u8 = 0x13;

pub const MAX_VOLUME: u8 = 64;
const MAX_FRAME: usize = 6;

/// One encoded frame. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioCommand {
    bytes: [u8; MAX_FRAME],
    len: usize,
}

impl AudioCommand {
    /// Volume above [`MAX_VOLUME`] is clamped.
    pub fn set_volume(volume: u8) -> Self {
        Self::encode(OP_SET_VOLUME, &[volume.min(MAX_VOLUME)])
    }

    pub fn play_track(track: u8) -> Self {
        Self::encode(OP_PLAY, &[0x00, track])
    }

    pub fn stop() -> Self {
        Self::encode(OP_STOP, &[])
    }

    fn encode(opcode: u8, payload: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_FRAME];
        bytes[0] = HEADER;
        bytes[1] = opcode;
        bytes[2] = payload.len() as u8;
        bytes[3..3 + payload.len()].copy_from_slice(payload);

        let len = 3 + payload.len();
        bytes[len] = checksum(&bytes[..len]);
        Self { bytes, len: len + 1 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Wrapping 8-bit sum.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Byte sink the frames go out on. Fire-and-forget: no acknowledgement, no retries.
pub trait AudioLink {
    fn send(&mut self, frame: &[u8]);
}

impl<L: AudioLink + ?Sized> AudioLink for &mut L {
    fn send(&mut self, frame: &[u8]) {
        (**self).send(frame)
    }
}

/// Builds frames and hands them to the link.
pub struct AudioEncoder<L> {
    link: L,
}

impl<L: AudioLink> AudioEncoder<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.send(AudioCommand::set_volume(volume));
    }

    pub fn play(&mut self, track: u8) {
        self.send(AudioCommand::play_track(track));
    }

    pub fn stop(&mut self) {
        self.send(AudioCommand::stop());
    }

    fn send(&mut self, command: AudioCommand) {
        self.link.send(command.as_bytes());
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}
