#![no_main]
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

// Integral floats print without a fraction and parse back as integers.
fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|((kx, x), (ky, y))| kx == ky && same(x, y))
        }
        _ => a == b,
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(original) = serde_json::from_str::<Value>(s) {
            let out = safejson::pretty_json(&original).expect("finite JSON input always encodes");
            let reparsed: Value = match serde_json::from_str(&out) {
                Ok(v) => v,
                Err(e) => panic!("printed invalid JSON: {e}\ninput: {s}\noutput: {out}"),
            };
            if !same(&original, &reparsed) {
                panic!("printing changed the document\ninput: {s}\noutput: {out}");
            }
            // masking never fails on untagged data
            let _ = safejson::secure_json(&original).expect("secure printing failed");
        }
    }
});
