//! 字段与列表元数据：线格式标签系统的静态描述。

use core::num::NonZeroU32;

/// 线格式编码种类，决定载荷字节如何铺设。
///
/// # 契约说明（What）
/// - `Varint`：无符号 LEB128 风格变长整数，7 位一组、高位为续符；有符号值按
///   补码扩展后编码（小负数昂贵）；
/// - `Zigzag`：先以 `(n << 1) ^ (n >> width-1)` 折叠再走变长编码，使小幅度负数
///   同样紧凑；线上与 `Varint` 共用同一标签线型；
/// - `Fixed32` / `Fixed64`：定长小端，含符号与无符号位模式一致；
/// - `LengthDelimited`：变长长度前缀 + 原始字节，覆盖文本、不透明字节与打包
///   列表载荷。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    Varint,
    Zigzag,
    Fixed32,
    Fixed64,
    LengthDelimited,
}

impl WireKind {
    /// 返回标签低三位使用的线型编号。
    ///
    /// `Zigzag` 与 `Varint` 在线上不可区分（折叠发生在编码前），因此共用线型 0。
    pub fn wire_type(&self) -> u8 {
        match self {
            WireKind::Varint | WireKind::Zigzag => 0,
            WireKind::Fixed64 => 1,
            WireKind::LengthDelimited => 2,
            WireKind::Fixed32 => 5,
        }
    }
}

/// 字段元数据：编号、编码种类与重复字段的打包布局开关。
///
/// # 设计背景（Why）
/// - 编码器在发射每个原语时需要知道当前字段编号以构造标签；列表布局（打包与
///   否）同样由字段元数据决定，而非写入调用方临场指定。
///
/// # 契约说明（What）
/// - `number`：正字段编号（`NonZeroU32`，类型层面排除 0）；
/// - `kind`：字段的声明编码种类，驱动列表布局并记录模式意图；标签线型最终由
///   实际调用的原语写入方法决定；
/// - `packed`：仅对重复数值字段有意义，指示元素是否省略标签、连续铺设。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    number: NonZeroU32,
    kind: WireKind,
    packed: bool,
}

impl FieldInfo {
    /// 构造未打包的字段元数据。
    pub fn new(number: NonZeroU32, kind: WireKind) -> Self {
        Self {
            number,
            kind,
            packed: false,
        }
    }

    /// 以 Builder 风格开启打包布局。
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    /// 返回字段编号。
    pub fn number(&self) -> NonZeroU32 {
        self.number
    }

    /// 返回声明的编码种类。
    pub fn kind(&self) -> WireKind {
        self.kind
    }

    /// 返回是否采用打包布局。
    pub fn is_packed(&self) -> bool {
        self.packed
    }
}

/// 列表元数据：为重复字段的元素序列提供计数与元素编码种类。
///
/// # 契约说明（What）
/// - `count`：元素个数，供实现预估载荷尺寸；
/// - `kind`：元素的编码种类；打包布局仅接受数值种类（变长、折叠变长与定长），
///   `LengthDelimited` 元素必须逐个携带标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListInfo {
    count: usize,
    kind: WireKind,
}

impl ListInfo {
    /// 构造列表元数据。
    pub fn new(count: usize, kind: WireKind) -> Self {
        Self { count, kind }
    }

    /// 返回元素个数。
    pub fn count(&self) -> usize {
        self.count
    }

    /// 返回元素编码种类。
    pub fn kind(&self) -> WireKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_number(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("测试字段编号必须为正")
    }

    #[test]
    fn wire_type_mapping_is_stable() {
        assert_eq!(WireKind::Varint.wire_type(), 0);
        assert_eq!(WireKind::Zigzag.wire_type(), 0);
        assert_eq!(WireKind::Fixed64.wire_type(), 1);
        assert_eq!(WireKind::LengthDelimited.wire_type(), 2);
        assert_eq!(WireKind::Fixed32.wire_type(), 5);
    }

    #[test]
    fn packed_builder_toggles_layout() {
        let plain = FieldInfo::new(field_number(4), WireKind::Varint);
        assert!(!plain.is_packed());
        assert!(plain.packed().is_packed());
    }
}
