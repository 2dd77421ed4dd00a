//! CRC-64 累加器
//!
//! 多项式 0x142F0E1EBA9EA3693，非反射（MSB优先），输出异或全1。
//!
//! 寄存器约定与工程文件写入方使用的 `crcmod` 参数一致
//! （`initCrc = 0`, `xorOut = 0xFFFF_FFFF_FFFF_FFFF`）：`initCrc` 是"空输入的摘要"，
//! 即移位寄存器预置为 `initCrc ^ xorOut`（全1）。"123456789" 的摘要为
//! `0x62EC59E3F1A4F00A`。
//!
//! 摘要可增量组合：任意切分输入后逐块 [`Crc64::update`]，结果与一次性计算相同。

/// 生成多项式（去掉最高位的 x^64）
pub const POLY: u64 = 0x42F0_E1EB_A9EA_3693;

/// 输出异或值
pub const XOR_OUT: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// 空输入的摘要值
pub const INIT_DIGEST: u64 = 0;

const TABLE: [u64; 256] = build_table();

const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut reg = (i as u64) << 56;
        let mut bit = 0;
        while bit < 8 {
            reg = if reg & (1 << 63) != 0 {
                (reg << 1) ^ POLY
            } else {
                reg << 1
            };
            bit += 1;
        }
        table[i] = reg;
        i += 1;
    }
    table
}

/// 每个校验任务独占的可重置累加器（无全局状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc64 {
    register: u64,
}

impl Crc64 {
    pub fn new() -> Self {
        Self::resume(INIT_DIGEST)
    }

    /// 从已有摘要继续累加（等价于 `crcmod` 的 `crc(data, previous)`）
    pub fn resume(digest: u64) -> Self {
        Self {
            register: digest ^ XOR_OUT,
        }
    }

    /// 累加一块数据
    pub fn update(&mut self, data: &[u8]) {
        let mut reg = self.register;
        for &byte in data {
            let idx = ((reg >> 56) as u8 ^ byte) as usize;
            reg = (reg << 8) ^ TABLE[idx];
        }
        self.register = reg;
    }

    /// 当前摘要（不消耗累加器，可继续 update）
    #[inline]
    pub fn digest(&self) -> u64 {
        self.register ^ XOR_OUT
    }

    /// 丢弃部分结果，回到初始状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 一次性计算
    pub fn checksum(data: &[u8]) -> u64 {
        let mut crc = Self::new();
        crc.update(data);
        crc.digest()
    }
}

impl Default for Crc64 {
    fn default() -> Self {
        Self::new()
    }
}
