use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

use super::AccountId;

/// The two outcomes of a coin flip.
///
/// The draw is a discrete two-value draw and the win condition is enum
/// equality against the caller's prediction. Anything malformed on the wire
/// fails decoding before it can reach settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    Heads = 0,
    Tails = 1,
}

impl Outcome {
    /// The outcome the other face of the coin shows.
    pub fn other(&self) -> Self {
        match self {
            Outcome::Heads => Outcome::Tails,
            Outcome::Tails => Outcome::Heads,
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::Heads),
            1 => Ok(Outcome::Tails),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl Write for Outcome {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Outcome {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Outcome::try_from(u8::read(reader)?)
    }
}

impl FixedSize for Outcome {
    const SIZE: usize = 1;
}

/// A single wager: stake `stake` coins on the flip landing `predicted`.
///
/// Constructed per call and discarded after resolution. Stake validation
/// (positive, within balance) happens in the engine; decoding only enforces
/// the shape of the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WagerRequest {
    pub account: AccountId,
    pub predicted: Outcome,
    pub stake: u64,
}

impl Write for WagerRequest {
    fn write(&self, writer: &mut impl BufMut) {
        self.account.write(writer);
        self.predicted.write(writer);
        self.stake.write(writer);
    }
}

impl Read for WagerRequest {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            account: AccountId::read(reader)?,
            predicted: Outcome::read(reader)?,
            stake: u64::read(reader)?,
        })
    }
}

impl FixedSize for WagerRequest {
    const SIZE: usize = AccountId::SIZE + Outcome::SIZE + 8;
}

/// Settlement of a wager: the drawn outcome and the balance after the single
/// atomic mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WagerResult {
    pub won: bool,
    pub outcome: Outcome,
    pub balance_after: u64,
}

impl Write for WagerResult {
    fn write(&self, writer: &mut impl BufMut) {
        self.won.write(writer);
        self.outcome.write(writer);
        self.balance_after.write(writer);
    }
}

impl Read for WagerResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            won: bool::read(reader)?,
            outcome: Outcome::read(reader)?,
            balance_after: u64::read(reader)?,
        })
    }
}

impl FixedSize for WagerResult {
    const SIZE: usize = 1 + Outcome::SIZE + 8;
}
