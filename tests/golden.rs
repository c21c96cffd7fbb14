use ctxscope::rewrite::{rewrite_source, Options};
use std::{fs, path::PathBuf};

fn golden_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("golden")
}

#[test]
fn golden_files_match() {
    let mut inputs: Vec<PathBuf> = fs::read_dir(golden_dir())
        .expect("golden dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("_in.go"))
        })
        .collect();
    inputs.sort();
    assert!(inputs.len() >= 2, "no golden inputs found");

    for input_path in inputs {
        let name = input_path
            .file_name()
            .and_then(|name| name.to_str())
            .expect("file name")
            .trim_end_matches("_in.go")
            .to_string();
        let input = fs::read_to_string(&input_path).expect("read input");
        let expected =
            fs::read_to_string(golden_dir().join(format!("{name}_out.go"))).expect("read output");

        let result = rewrite_source(&input, &Options::default()).expect("rewrite");
        assert_eq!(result.output, expected, "golden mismatch for {name}");

        let again = rewrite_source(&result.output, &Options::default()).expect("rewrite again");
        assert_eq!(again.output, expected, "second run changed {name}");
        assert!(!again.changed);
    }
}
