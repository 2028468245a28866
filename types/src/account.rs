use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use std::fmt;

use super::MAX_NAME_LENGTH;

/// Opaque account identifier (the store's auto-increment primary key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Write for AccountId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for AccountId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u64::read(reader)?))
    }
}

impl FixedSize for AccountId {
    const SIZE: usize = 8;
}

/// Hosting resource kinds purchasable in the shop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResourceKind {
    Ram = 0,
    Disk = 1,
    Cpu = 2,
    Allocations = 3,
    Databases = 4,
    Backups = 5,
    Slots = 6,
}

impl ResourceKind {
    /// All kinds, in wire order.
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Ram,
        ResourceKind::Disk,
        ResourceKind::Cpu,
        ResourceKind::Allocations,
        ResourceKind::Databases,
        ResourceKind::Backups,
        ResourceKind::Slots,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Ram => "ram",
            ResourceKind::Disk => "disk",
            ResourceKind::Cpu => "cpu",
            ResourceKind::Allocations => "allocations",
            ResourceKind::Databases => "databases",
            ResourceKind::Backups => "backups",
            ResourceKind::Slots => "slots",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Write for ResourceKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for ResourceKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::Ram),
            1 => Ok(Self::Disk),
            2 => Ok(Self::Cpu),
            3 => Ok(Self::Allocations),
            4 => Ok(Self::Databases),
            5 => Ok(Self::Backups),
            6 => Ok(Self::Slots),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for ResourceKind {
    const SIZE: usize = 1;
}

/// Resource counters carried on an account record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resources {
    pub ram: u64,
    pub disk: u64,
    pub cpu: u64,
    pub allocations: u64,
    pub databases: u64,
    pub backups: u64,
    pub slots: u64,
}

impl Resources {
    /// Current amount held of a resource kind.
    pub fn amount(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Ram => self.ram,
            ResourceKind::Disk => self.disk,
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Allocations => self.allocations,
            ResourceKind::Databases => self.databases,
            ResourceKind::Backups => self.backups,
            ResourceKind::Slots => self.slots,
        }
    }

    /// Add to a resource counter, saturating at the top of the range.
    pub fn grant(&mut self, kind: ResourceKind, amount: u64) {
        let counter = match kind {
            ResourceKind::Ram => &mut self.ram,
            ResourceKind::Disk => &mut self.disk,
            ResourceKind::Cpu => &mut self.cpu,
            ResourceKind::Allocations => &mut self.allocations,
            ResourceKind::Databases => &mut self.databases,
            ResourceKind::Backups => &mut self.backups,
            ResourceKind::Slots => &mut self.slots,
        };
        *counter = counter.saturating_add(amount);
    }
}

impl Write for Resources {
    fn write(&self, writer: &mut impl BufMut) {
        self.ram.write(writer);
        self.disk.write(writer);
        self.cpu.write(writer);
        self.allocations.write(writer);
        self.databases.write(writer);
        self.backups.write(writer);
        self.slots.write(writer);
    }
}

impl Read for Resources {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            ram: u64::read(reader)?,
            disk: u64::read(reader)?,
            cpu: u64::read(reader)?,
            allocations: u64::read(reader)?,
            databases: u64::read(reader)?,
            backups: u64::read(reader)?,
            slots: u64::read(reader)?,
        })
    }
}

impl FixedSize for Resources {
    const SIZE: usize = 7 * 8;
}

/// Account record held by the externally-owned store.
///
/// The balance is a `u64`: non-negativity is a type invariant, and every
/// debit goes through a guarded subtraction before it is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub coins: u64,
    pub resources: Resources,
    pub servers: u64,
    pub suspended: bool,
}

impl Account {
    pub fn new(id: AccountId, name: String, coins: u64, resources: Resources) -> Self {
        Self {
            id,
            name,
            coins,
            resources,
            servers: 0,
            suspended: false,
        }
    }
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_name(&self.name, writer);
        self.coins.write(writer);
        self.resources.write(writer);
        self.servers.write(writer);
        self.suspended.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: AccountId::read(reader)?,
            name: read_name(reader)?,
            coins: u64::read(reader)?,
            resources: Resources::read(reader)?,
            servers: u64::read(reader)?,
            suspended: bool::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        AccountId::SIZE
            + name_encode_size(&self.name)
            + self.coins.encode_size()
            + Resources::SIZE
            + self.servers.encode_size()
            + self.suspended.encode_size()
    }
}

/// Write an account name as length-prefixed UTF-8 bytes.
fn write_name(name: &str, writer: &mut impl BufMut) {
    let bytes = name.as_bytes();
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Read an account name, enforcing [MAX_NAME_LENGTH].
fn read_name(reader: &mut impl Buf) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > MAX_NAME_LENGTH {
        return Err(Error::Invalid("Account", "name too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("Account", "name is invalid UTF-8"))
}

fn name_encode_size(name: &str) -> usize {
    4 + name.len()
}
