#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wick_codec_tagwire::varint;

/// Fuzz 用例：同时覆盖"任意字节解码"与"任意值编码往返"两条路径。
///
/// - **Why**：变长整数是标签、长度前缀与数值字段共用的地基，解码端面对任意
///   字节绝不允许 panic，编码端必须与解码端构成恒等往返。
/// - **How**：`raw` 交给解码器做健壮性检查；`value` 走编码-解码差分比较；
///   折叠（zigzag）路径以 `signed` 验证折叠-展开恒等。
/// - **What**：Fuzzer 自动生成任意组合，任何崩溃或恒等破坏都是缺陷。
#[derive(Debug, Arbitrary)]
struct VarintCase {
    raw: Vec<u8>,
    value: u64,
    signed: i64,
}

fuzz_target!(|case: VarintCase| {
    // 解码任意字节：截断与超长输入必须温和地返回 None。
    if let Some((decoded, consumed)) = varint::decode_u64(&case.raw) {
        assert!(consumed >= 1 && consumed <= varint::MAX_VARINT_LEN);
        // 重新编码必须恰好复现被消费的前缀。
        let mut reencoded = Vec::new();
        varint::put_uvarint(&mut reencoded, decoded).expect("Vec 汇不会失败");
        assert_eq!(&case.raw[..consumed], reencoded.as_slice());
    }

    // 编码-解码往返恒等，且长度与位宽公式一致。
    let mut encoded = Vec::new();
    varint::put_uvarint(&mut encoded, case.value).expect("Vec 汇不会失败");
    assert_eq!(encoded.len(), varint::encoded_len_u64(case.value));
    let (roundtrip, consumed) = varint::decode_u64(&encoded).expect("自产字节必可解码");
    assert_eq!(roundtrip, case.value);
    assert_eq!(consumed, encoded.len());

    // 折叠-展开恒等。
    assert_eq!(varint::unfold64(varint::fold64(case.signed)), case.signed);
});
