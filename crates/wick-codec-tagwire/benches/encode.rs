use criterion::{Criterion, black_box};
use std::num::NonZeroU32;
use std::{env, time::Duration};

use wick_codec_tagwire::TagWriter;
use wick_core::codec::{FieldInfo, FrameWriter, ListInfo, WireKind};

fn field(number: u32, kind: WireKind) -> FieldInfo {
    FieldInfo::new(NonZeroU32::new(number).expect("字段编号必须为正"), kind)
}

/// 基准：典型消息（变长字段 + 文本字段 + 打包列表）的完整编码往返成本。
///
/// # 设计背景（Why）
/// - 编码热路径由标签发射与变长整数铺设主导，打包列表额外引入暂存区；基准
///   用于观测契约层抽象（trait 分发、帧栈）相对裸写字节的开销回归。
fn bench_encode_message(c: &mut Criterion) {
    c.bench_function("encode_message", |b| {
        b.iter(|| {
            let mut writer = TagWriter::new(Vec::with_capacity(128));
            writer.begin_field(field(1, WireKind::Varint)).unwrap();
            writer.write_uint64(black_box(150)).unwrap();
            writer.end_field().unwrap();

            writer
                .begin_field(field(2, WireKind::LengthDelimited))
                .unwrap();
            writer.write_string(black_box("hello world")).unwrap();
            writer.end_field().unwrap();

            writer
                .begin_field(field(4, WireKind::Varint).packed())
                .unwrap();
            writer.begin_list(ListInfo::new(3, WireKind::Varint)).unwrap();
            for value in [3u32, 270, 86942] {
                writer.write_uint32(black_box(value)).unwrap();
            }
            writer.end_list().unwrap();
            writer.end_field().unwrap();

            writer.flush().unwrap();
            black_box(writer.into_inner())
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_encode_message(&mut criterion);
    criterion.final_summary();
}
