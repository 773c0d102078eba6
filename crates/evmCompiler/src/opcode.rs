use std::fmt;

/// Every source-machine opcode the compiler recognises.
///
/// Families that differ only by an index carry it: `Push(1..=32)`, `Dup(1..=16)`,
/// `Swap(1..=16)` and `Log(0..=4)`. Unassigned bytes decode as `Invalid(byte)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // 0s: stop and arithmetic
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    Sdiv,
    Mod,
    Smod,
    AddMod,
    MulMod,
    Exp,
    SignExtend,
    // 10s: comparison and bitwise logic
    Lt,
    Gt,
    Slt,
    Sgt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,
    Shl,
    Shr,
    Sar,
    // 20s
    Sha3,
    // 30s: environment
    Address,
    Balance,
    Origin,
    Caller,
    CallValue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    CodeSize,
    CodeCopy,
    GasPrice,
    ExtCodeSize,
    ExtCodeCopy,
    ReturnDataSize,
    ReturnDataCopy,
    ExtCodeHash,
    // 40s: block information
    BlockHash,
    Coinbase,
    Timestamp,
    Number,
    Difficulty,
    GasLimit,
    ChainId,
    SelfBalance,
    // 50s: stack, memory, storage and flow
    Pop,
    MLoad,
    MStore,
    MStore8,
    SLoad,
    SStore,
    Jump,
    JumpI,
    GetPc,
    MSize,
    Gas,
    JumpDest,
    // 60s - a0s
    Push(u8),
    Dup(u8),
    Swap(u8),
    Log(u8),
    // f0s: system
    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Create2,
    StaticCall,
    Revert,
    Invalid(u8),
    SelfDestruct,
}

impl Opcode {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Stop,
            0x01 => Self::Add,
            0x02 => Self::Mul,
            0x03 => Self::Sub,
            0x04 => Self::Div,
            0x05 => Self::Sdiv,
            0x06 => Self::Mod,
            0x07 => Self::Smod,
            0x08 => Self::AddMod,
            0x09 => Self::MulMod,
            0x0a => Self::Exp,
            0x0b => Self::SignExtend,
            0x10 => Self::Lt,
            0x11 => Self::Gt,
            0x12 => Self::Slt,
            0x13 => Self::Sgt,
            0x14 => Self::Eq,
            0x15 => Self::IsZero,
            0x16 => Self::And,
            0x17 => Self::Or,
            0x18 => Self::Xor,
            0x19 => Self::Not,
            0x1a => Self::Byte,
            0x1b => Self::Shl,
            0x1c => Self::Shr,
            0x1d => Self::Sar,
            0x20 => Self::Sha3,
            0x30 => Self::Address,
            0x31 => Self::Balance,
            0x32 => Self::Origin,
            0x33 => Self::Caller,
            0x34 => Self::CallValue,
            0x35 => Self::CallDataLoad,
            0x36 => Self::CallDataSize,
            0x37 => Self::CallDataCopy,
            0x38 => Self::CodeSize,
            0x39 => Self::CodeCopy,
            0x3a => Self::GasPrice,
            0x3b => Self::ExtCodeSize,
            0x3c => Self::ExtCodeCopy,
            0x3d => Self::ReturnDataSize,
            0x3e => Self::ReturnDataCopy,
            0x3f => Self::ExtCodeHash,
            0x40 => Self::BlockHash,
            0x41 => Self::Coinbase,
            0x42 => Self::Timestamp,
            0x43 => Self::Number,
            0x44 => Self::Difficulty,
            0x45 => Self::GasLimit,
            0x46 => Self::ChainId,
            0x47 => Self::SelfBalance,
            0x50 => Self::Pop,
            0x51 => Self::MLoad,
            0x52 => Self::MStore,
            0x53 => Self::MStore8,
            0x54 => Self::SLoad,
            0x55 => Self::SStore,
            0x56 => Self::Jump,
            0x57 => Self::JumpI,
            0x58 => Self::GetPc,
            0x59 => Self::MSize,
            0x5a => Self::Gas,
            0x5b => Self::JumpDest,
            0x60..=0x7f => Self::Push(byte - 0x5f),
            0x80..=0x8f => Self::Dup(byte - 0x7f),
            0x90..=0x9f => Self::Swap(byte - 0x8f),
            0xa0..=0xa4 => Self::Log(byte - 0xa0),
            0xf0 => Self::Create,
            0xf1 => Self::Call,
            0xf2 => Self::CallCode,
            0xf3 => Self::Return,
            0xf4 => Self::DelegateCall,
            0xf5 => Self::Create2,
            0xfa => Self::StaticCall,
            0xfd => Self::Revert,
            0xff => Self::SelfDestruct,
            other => Self::Invalid(other),
        }
    }

    #[must_use]
    pub const fn byte(&self) -> u8 {
        match self {
            Self::Stop => 0x00,
            Self::Add => 0x01,
            Self::Mul => 0x02,
            Self::Sub => 0x03,
            Self::Div => 0x04,
            Self::Sdiv => 0x05,
            Self::Mod => 0x06,
            Self::Smod => 0x07,
            Self::AddMod => 0x08,
            Self::MulMod => 0x09,
            Self::Exp => 0x0a,
            Self::SignExtend => 0x0b,
            Self::Lt => 0x10,
            Self::Gt => 0x11,
            Self::Slt => 0x12,
            Self::Sgt => 0x13,
            Self::Eq => 0x14,
            Self::IsZero => 0x15,
            Self::And => 0x16,
            Self::Or => 0x17,
            Self::Xor => 0x18,
            Self::Not => 0x19,
            Self::Byte => 0x1a,
            Self::Shl => 0x1b,
            Self::Shr => 0x1c,
            Self::Sar => 0x1d,
            Self::Sha3 => 0x20,
            Self::Address => 0x30,
            Self::Balance => 0x31,
            Self::Origin => 0x32,
            Self::Caller => 0x33,
            Self::CallValue => 0x34,
            Self::CallDataLoad => 0x35,
            Self::CallDataSize => 0x36,
            Self::CallDataCopy => 0x37,
            Self::CodeSize => 0x38,
            Self::CodeCopy => 0x39,
            Self::GasPrice => 0x3a,
            Self::ExtCodeSize => 0x3b,
            Self::ExtCodeCopy => 0x3c,
            Self::ReturnDataSize => 0x3d,
            Self::ReturnDataCopy => 0x3e,
            Self::ExtCodeHash => 0x3f,
            Self::BlockHash => 0x40,
            Self::Coinbase => 0x41,
            Self::Timestamp => 0x42,
            Self::Number => 0x43,
            Self::Difficulty => 0x44,
            Self::GasLimit => 0x45,
            Self::ChainId => 0x46,
            Self::SelfBalance => 0x47,
            Self::Pop => 0x50,
            Self::MLoad => 0x51,
            Self::MStore => 0x52,
            Self::MStore8 => 0x53,
            Self::SLoad => 0x54,
            Self::SStore => 0x55,
            Self::Jump => 0x56,
            Self::JumpI => 0x57,
            Self::GetPc => 0x58,
            Self::MSize => 0x59,
            Self::Gas => 0x5a,
            Self::JumpDest => 0x5b,
            Self::Push(n) => 0x5f + *n,
            Self::Dup(n) => 0x7f + *n,
            Self::Swap(n) => 0x8f + *n,
            Self::Log(n) => 0xa0 + *n,
            Self::Create => 0xf0,
            Self::Call => 0xf1,
            Self::CallCode => 0xf2,
            Self::Return => 0xf3,
            Self::DelegateCall => 0xf4,
            Self::Create2 => 0xf5,
            Self::StaticCall => 0xfa,
            Self::Revert => 0xfd,
            Self::Invalid(byte) => *byte,
            Self::SelfDestruct => 0xff,
        }
    }

    /// Number of immediate bytes following the opcode byte.
    #[must_use]
    pub const fn operand_size(&self) -> usize {
        match self {
            Self::Push(n) => *n as usize,
            _ => 0,
        }
    }

    #[must_use]
    pub fn mnemonic(&self) -> String {
        match self {
            Self::Push(n) => format!("PUSH{n}"),
            Self::Dup(n) => format!("DUP{n}"),
            Self::Swap(n) => format!("SWAP{n}"),
            Self::Log(n) => format!("LOG{n}"),
            other => other.fixed_mnemonic().to_string(),
        }
    }

    const fn fixed_mnemonic(&self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Add => "ADD",
            Self::Mul => "MUL",
            Self::Sub => "SUB",
            Self::Div => "DIV",
            Self::Sdiv => "SDIV",
            Self::Mod => "MOD",
            Self::Smod => "SMOD",
            Self::AddMod => "ADDMOD",
            Self::MulMod => "MULMOD",
            Self::Exp => "EXP",
            Self::SignExtend => "SIGNEXTEND",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Slt => "SLT",
            Self::Sgt => "SGT",
            Self::Eq => "EQ",
            Self::IsZero => "ISZERO",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Not => "NOT",
            Self::Byte => "BYTE",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
            Self::Sar => "SAR",
            Self::Sha3 => "SHA3",
            Self::Address => "ADDRESS",
            Self::Balance => "BALANCE",
            Self::Origin => "ORIGIN",
            Self::Caller => "CALLER",
            Self::CallValue => "CALLVALUE",
            Self::CallDataLoad => "CALLDATALOAD",
            Self::CallDataSize => "CALLDATASIZE",
            Self::CallDataCopy => "CALLDATACOPY",
            Self::CodeSize => "CODESIZE",
            Self::CodeCopy => "CODECOPY",
            Self::GasPrice => "GASPRICE",
            Self::ExtCodeSize => "EXTCODESIZE",
            Self::ExtCodeCopy => "EXTCODECOPY",
            Self::ReturnDataSize => "RETURNDATASIZE",
            Self::ReturnDataCopy => "RETURNDATACOPY",
            Self::ExtCodeHash => "EXTCODEHASH",
            Self::BlockHash => "BLOCKHASH",
            Self::Coinbase => "COINBASE",
            Self::Timestamp => "TIMESTAMP",
            Self::Number => "NUMBER",
            Self::Difficulty => "DIFFICULTY",
            Self::GasLimit => "GASLIMIT",
            Self::ChainId => "CHAINID",
            Self::SelfBalance => "SELFBALANCE",
            Self::Pop => "POP",
            Self::MLoad => "MLOAD",
            Self::MStore => "MSTORE",
            Self::MStore8 => "MSTORE8",
            Self::SLoad => "SLOAD",
            Self::SStore => "SSTORE",
            Self::Jump => "JUMP",
            Self::JumpI => "JUMPI",
            Self::GetPc => "GETPC",
            Self::MSize => "MSIZE",
            Self::Gas => "GAS",
            Self::JumpDest => "JUMPDEST",
            Self::Create => "CREATE",
            Self::Call => "CALL",
            Self::CallCode => "CALLCODE",
            Self::Return => "RETURN",
            Self::DelegateCall => "DELEGATECALL",
            Self::Create2 => "CREATE2",
            Self::StaticCall => "STATICCALL",
            Self::Revert => "REVERT",
            Self::Invalid(_) => "INVALID",
            Self::SelfDestruct => "SELFDESTRUCT",
            Self::Push(_) => "PUSH",
            Self::Dup(_) => "DUP",
            Self::Swap(_) => "SWAP",
            Self::Log(_) => "LOG",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(byte) => write!(f, "INVALID(0x{byte:02x})"),
            other => write!(f, "{}", other.mnemonic()),
        }
    }
}
