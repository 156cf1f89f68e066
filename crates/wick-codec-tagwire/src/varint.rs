//! 变长整数与折叠（zigzag）原语。
//!
//! # 模块定位（Why）
//! - 变长整数是标签线格式的地基：标签本身、长度前缀与全部变长数值字段都由
//!   同一套 LEB128 风格编码铺设——7 位一组、低位在前、字节高位为续符。
//! - 折叠编码解决"小负数昂贵"问题：补码扩展下 `-1` 要占满 10 字节，折叠后
//!   小幅度负数与正数同样紧凑。
//!
//! # 契约说明（What）
//! - 编码侧以 [`ByteSink`] 为输出，函数保证发射字节数等于
//!   [`encoded_len_u64`] 的返回值；
//! - 解码侧为测试与差分校验服务：输入截断或超长（超过 10 字节仍有续符）返回
//!   `None`，绝不 panic。

use wick_core::codec::ByteSink;
use wick_core::{CoreError, Result};

/// 变长编码的最大字节数（64 位值，7 位一组）。
pub const MAX_VARINT_LEN: usize = 10;

/// 返回 `value` 的变长编码字节数：`max(1, ceil(bit_length / 7))`。
///
/// 0 恰好编码为一个零字节。
pub fn encoded_len_u64(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7)
}

/// 把 `value` 以 LEB128 风格写入汇。
pub fn put_uvarint<S>(sink: &mut S, mut value: u64) -> Result<(), CoreError>
where
    S: ByteSink + ?Sized,
{
    let mut scratch = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            scratch[len] = byte;
            len += 1;
            break;
        }
        scratch[len] = byte | 0x80;
        len += 1;
    }
    sink.write_all(&scratch[..len])
}

/// 从 `src` 头部解码一个变长整数，返回值与消耗的字节数。
///
/// 输入截断或超长时返回 `None`。
pub fn decode_u64(src: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (index, byte) in src.iter().enumerate() {
        if index >= MAX_VARINT_LEN {
            return None;
        }
        let payload = u64::from(byte & 0x7F);
        // 第 10 个字节只允许携带最后 1 个有效位。
        if index == MAX_VARINT_LEN - 1 && payload > 1 {
            return None;
        }
        value |= payload << (index * 7);
        if byte & 0x80 == 0 {
            return Some((value, index + 1));
        }
    }
    None
}

/// 32 位折叠：`(n << 1) ^ (n >> 31)`，小幅度负数映射到小无符号值。
pub fn fold32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// 32 位展开，[`fold32`] 的逆运算。
pub fn unfold32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// 64 位折叠：`(n << 1) ^ (n >> 63)`。
pub fn fold64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// 64 位展开，[`fold64`] 的逆运算。
pub fn unfold64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
