#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::num::NonZeroU32;
use wick_codec_tagwire::TagWriter;
use wick_core::codec::{FieldInfo, FrameWriter, ListInfo, WireKind};
use wick_core::codes;

/// Fuzz 指令：描述一次编码器操作序列。
///
/// - **Why**：帧配对状态机的正确性承诺是"平衡序列从不失败、失衡操作即刻失败
///   并中毒"；影子模型逐操作预测编码器的接受/拒绝，任何分歧都是缺陷。
/// - **How**：操作涵盖帧开闭、全部原语家族与 `flush`/`reset`；影子模型只追踪
///   帧栈类别与打包态，与实现的内部表示相互独立。
/// - **What**：Fuzzer 生成任意长度指令流，验证编码器永不 panic、错误码与
///   模型预测一致。
#[derive(Debug, Arbitrary)]
struct WriterCase {
    ops: Vec<WriterOp>,
}

#[derive(Debug, Arbitrary)]
enum WriterOp {
    BeginField { number: u16, kind: KindSpec, packed: bool },
    EndField,
    BeginList { count: u8, kind: KindSpec },
    EndList,
    WriteUint { value: u64 },
    WriteSint { value: i64 },
    WriteFixed { value: u32 },
    WriteString,
    WriteBool { value: bool },
    Flush,
    Reset,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum KindSpec {
    Varint,
    Zigzag,
    Fixed32,
    Fixed64,
    LengthDelimited,
}

impl From<KindSpec> for WireKind {
    fn from(spec: KindSpec) -> Self {
        match spec {
            KindSpec::Varint => WireKind::Varint,
            KindSpec::Zigzag => WireKind::Zigzag,
            KindSpec::Fixed32 => WireKind::Fixed32,
            KindSpec::Fixed64 => WireKind::Fixed64,
            KindSpec::LengthDelimited => WireKind::LengthDelimited,
        }
    }
}

/// 影子模型：独立追踪帧栈与打包态，预测每个操作应被接受还是拒绝。
#[derive(Default)]
struct Model {
    frames: Vec<ModelFrame>,
    packed: bool,
    poisoned: bool,
}

#[derive(Clone, Copy)]
enum ModelFrame {
    Field { packed: bool },
    List,
}

impl Model {
    fn innermost_field(&self) -> Option<bool> {
        self.frames.iter().rev().find_map(|frame| match frame {
            ModelFrame::Field { packed } => Some(*packed),
            ModelFrame::List => None,
        })
    }
}

fuzz_target!(|case: WriterCase| {
    let mut writer = TagWriter::new(Vec::new());
    let mut model = Model::default();

    for op in case.ops {
        match op {
            WriterOp::BeginField { number, kind, packed } => {
                let number = NonZeroU32::new(u32::from(number).max(1)).expect("编号非零");
                let mut field = FieldInfo::new(number, kind.into());
                if packed {
                    field = field.packed();
                }
                let outcome = writer.begin_field(field);
                if model.poisoned {
                    expect_code(outcome, codes::CODEC_POISONED);
                } else if model.packed {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                } else {
                    outcome.expect("合法 begin_field 不应失败");
                    model.frames.push(ModelFrame::Field { packed });
                }
            }
            WriterOp::EndField => {
                let outcome = writer.end_field();
                if model.poisoned {
                    expect_code(outcome, codes::CODEC_POISONED);
                } else if matches!(model.frames.last(), Some(ModelFrame::Field { .. })) {
                    outcome.expect("合法 end_field 不应失败");
                    model.frames.pop();
                } else {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                }
            }
            WriterOp::BeginList { count, kind } => {
                let list = ListInfo::new(usize::from(count), kind.into());
                let outcome = writer.begin_list(list);
                if model.poisoned {
                    expect_code(outcome, codes::CODEC_POISONED);
                } else if model.packed {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                } else if let Some(ModelFrame::Field { packed }) = model.frames.last().copied() {
                    if packed && matches!(WireKind::from(kind), WireKind::LengthDelimited) {
                        expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                        model.poisoned = true;
                    } else {
                        outcome.expect("合法 begin_list 不应失败");
                        model.frames.push(ModelFrame::List);
                        model.packed = packed;
                    }
                } else {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                }
            }
            WriterOp::EndList => {
                let outcome = writer.end_list();
                if model.poisoned {
                    expect_code(outcome, codes::CODEC_POISONED);
                } else if matches!(model.frames.last(), Some(ModelFrame::List)) {
                    outcome.expect("合法 end_list 不应失败");
                    model.frames.pop();
                    model.packed = false;
                } else {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                }
            }
            WriterOp::WriteUint { value } => {
                drive_primitive(&mut writer, &mut model, |w| w.write_uint64(value));
            }
            WriterOp::WriteSint { value } => {
                drive_primitive(&mut writer, &mut model, |w| w.write_sint64(value));
            }
            WriterOp::WriteFixed { value } => {
                drive_primitive(&mut writer, &mut model, |w| w.write_fixed32(value));
            }
            WriterOp::WriteString => {
                let outcome = writer.write_string("fuzz");
                if model.poisoned {
                    expect_code(outcome, codes::CODEC_POISONED);
                } else if model.packed {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                } else if model.innermost_field().is_some() {
                    outcome.expect("字段内写文本不应失败");
                } else {
                    expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
                    model.poisoned = true;
                }
            }
            WriterOp::WriteBool { value } => {
                drive_primitive(&mut writer, &mut model, |w| w.write_bool(value));
            }
            WriterOp::Flush => {
                let outcome = writer.flush();
                if model.poisoned {
                    expect_code(outcome, codes::CODEC_POISONED);
                } else {
                    outcome.expect("冲刷不应失败");
                }
            }
            WriterOp::Reset => {
                writer.reset();
                model = Model::default();
            }
        }

        assert_eq!(writer.is_poisoned(), model.poisoned, "中毒态与模型分歧");
    }
});

/// 数值原语的统一驱动：打包运行内恒被接受，否则需要最内层字段。
fn drive_primitive<F>(writer: &mut TagWriter<Vec<u8>>, model: &mut Model, write: F)
where
    F: FnOnce(&mut TagWriter<Vec<u8>>) -> wick_core::Result<(), wick_core::CoreError>,
{
    let outcome = write(writer);
    if model.poisoned {
        expect_code(outcome, codes::CODEC_POISONED);
    } else if model.packed || model.innermost_field().is_some() {
        outcome.expect("合法原语写入不应失败");
    } else {
        expect_code(outcome, codes::CODEC_UNBALANCED_FRAME);
        model.poisoned = true;
    }
}

fn expect_code(outcome: wick_core::Result<(), wick_core::CoreError>, code: &'static str) {
    let err = outcome.expect_err("模型预测该操作必须失败");
    assert_eq!(err.code(), code, "错误码与模型预测不符");
}
