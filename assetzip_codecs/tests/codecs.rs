/// Bundled codecs: round-trip, documented worst-case bounds, determinism,
/// and the on-chain compatible byte layouts.
use assetzip_codecs::{
    codec_for_mode, CalldataCodec, FastLzCodec, Lz4Codec, PassThroughCodec, ZstdCodec,
};
use assetzip_core::{Codec, CodecMode};

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// Palette-indexed pixel rows: long zero runs, 0xff alpha bytes, repeated rows.
fn trait_like_bytes(len: usize) -> Vec<u8> {
    let row: Vec<u8> = (0..48u8)
        .map(|x| match x % 12 {
            0..=5 => 0x00,
            6 | 7 => 0xff,
            n => n * 17,
        })
        .collect();
    (0..len).map(|i| row[i % row.len()]).collect()
}

fn all_codecs() -> Vec<Box<dyn Codec>> {
    vec![
        Box::new(FastLzCodec),
        Box::new(CalldataCodec),
        Box::new(ZstdCodec::default()),
        Box::new(Lz4Codec),
        Box::new(PassThroughCodec),
    ]
}

fn samples() -> Vec<Vec<u8>> {
    let mut out = vec![
        Vec::new(),
        vec![0x00],
        vec![0xff],
        vec![0x00; 16],
        vec![0xde, 0xad, 0xbe, 0xef],
        vec![0xff; 100],
        vec![0x00; 1000],
    ];
    for len in [13, 14, 15, 31, 32, 33, 300, 9000] {
        out.push(pseudo_random_bytes(len, len as u64));
        out.push(trait_like_bytes(len));
    }
    out
}

#[test]
fn every_codec_round_trips() {
    for codec in all_codecs() {
        for data in samples() {
            let compressed = codec.compress(&data).unwrap();
            let restored = codec.decompress(&compressed).unwrap();
            assert_eq!(
                restored,
                data,
                "{} round-trip failed for {} bytes",
                codec.name(),
                data.len()
            );
        }
    }
}

#[test]
fn every_codec_stays_within_its_documented_bound() {
    for codec in all_codecs() {
        for data in samples() {
            let compressed = codec.compress(&data).unwrap();
            let bound = codec
                .max_compressed_len(data.len())
                .expect("bundled codecs document a bound");
            assert!(
                compressed.len() <= bound,
                "{}: {} bytes in, {} out, bound {}",
                codec.name(),
                data.len(),
                compressed.len(),
                bound
            );
        }
    }
}

#[test]
fn every_codec_is_deterministic() {
    let data = trait_like_bytes(5000);
    for codec in all_codecs() {
        assert_eq!(codec.compress(&data).unwrap(), codec.compress(&data).unwrap());
    }
}

#[test]
fn codec_for_mode_resolves_each_mode() {
    for mode in CodecMode::ALL {
        assert_eq!(codec_for_mode(mode, 3).mode(), mode);
    }
}

#[test]
fn flz_shrinks_repetitive_assets() {
    let data = trait_like_bytes(4096);
    let compressed = FastLzCodec.compress(&data).unwrap();
    assert!(
        compressed.len() * 4 < data.len(),
        "flz should compress repeated rows well: {} -> {}",
        data.len(),
        compressed.len()
    );
}

#[test]
fn flz_random_data_expands_by_at_most_one_byte_per_32() {
    let data = pseudo_random_bytes(3200, 0xDEAD_BEEF);
    let compressed = FastLzCodec.compress(&data).unwrap();
    assert!(compressed.len() <= 3200 + 100 + 1);
}

#[test]
fn calldata_collapses_zero_runs() {
    let compressed = CalldataCodec.compress(&[0u8; 256]).unwrap();
    // Two maximal runs of 128, two bytes each.
    assert_eq!(compressed.len(), 4);
    assert_eq!(CalldataCodec.decompress(&compressed).unwrap(), vec![0u8; 256]);
}

#[test]
fn calldata_splits_long_ff_runs() {
    let data = vec![0xffu8; 70];
    let compressed = CalldataCodec.compress(&data).unwrap();
    // 32 + 32 + 6
    assert_eq!(compressed.len(), 6);
    assert_eq!(CalldataCodec.decompress(&compressed).unwrap(), data);
}

#[test]
fn passthrough_is_identity() {
    let data = pseudo_random_bytes(77, 1);
    assert_eq!(PassThroughCodec.compress(&data).unwrap(), data);
}

#[test]
fn corrupt_input_is_an_error_not_a_panic() {
    assert!(FastLzCodec.decompress(&[0xe0]).is_err());
    assert!(CalldataCodec.decompress(&[0xff]).is_err());
    assert!(Lz4Codec.decompress(&[0x10, 0x00, 0x00, 0x00, 0xff]).is_err());
    assert!(ZstdCodec::default().decompress(b"not a zstd frame").is_err());
}
