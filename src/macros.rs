//! Small codegen helpers for wire-format roundtrip tests.

// helpers for roundtrip tests
#[macro_export]
macro_rules! test_from_network {
    ($slice:expr, $t:ty) => {{
        let s: &[u8] = $slice;
        let mut buffer = std::io::Cursor::new(s);
        let mut v = <$t>::default();
        $crate::wire::ToFromNetworkOrder::from_network_bytes(&mut v, &mut buffer).unwrap();
        v
    }};
}

#[macro_export]
macro_rules! test_to_network {
    ($data:expr) => {{
        let mut buffer: Vec<u8> = Vec::new();
        let bytes_written =
            $crate::wire::ToFromNetworkOrder::to_network_bytes(&$data, &mut buffer).unwrap();
        (buffer, bytes_written)
    }};
}
