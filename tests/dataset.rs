extern crate cotrec;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use cotrec::prelude::*;


fn rating_file(name: &str, content: &str) -> PathBuf {
    let path = env::temp_dir()
        .join(format!("cotrec-dataset-{name}-{}.csv", process::id()));
    fs::write(&path, content).unwrap();
    path
}


#[test]
fn reads_a_headered_file_by_column_name() {
    let path = rating_file(
        "headered",
        "user_id,item_id,rating\n\
         u1,i1,5\n\
         u1,i2,3\n\
         u2,i1,1\n",
    );

    let data = DatasetReader::new()
        .file(&path)
        .read()
        .unwrap();

    assert_eq!(data.shape(), (2, 2));
    assert_eq!(
        data.interactions(),
        &[
            Interaction { user: 0, item: 0, rating: 5.0 },
            Interaction { user: 0, item: 1, rating: 3.0 },
            Interaction { user: 1, item: 0, rating: 1.0 },
        ],
    );
}


#[test]
fn reads_a_headerless_tab_file_positionally() {
    let path = rating_file(
        "headerless",
        "10\t20\t4\n\
         11\t20\t2\n",
    );

    let data = DatasetReader::new()
        .file(path.to_str().unwrap())
        .separator(b'\t')
        .has_header(false)
        .read()
        .unwrap();

    assert_eq!(data.shape(), (2, 1));
    assert_eq!(data.interactions()[0].rating, 4.0);
}


#[test]
fn binarization_keeps_only_ratings_at_the_threshold() {
    let path = rating_file(
        "binary",
        "user_id,item_id,rating\n\
         u1,i1,5\n\
         u1,i2,3\n\
         u2,i1,4\n",
    );

    let data = DatasetReader::new()
        .file(&path)
        .make_binary(true, 4.0)
        .read()
        .unwrap();

    assert_eq!(data.len(), 2);
    assert!(data.interactions().iter().all(|r| r.rating == 1.0));
}


#[test]
fn a_missing_column_is_a_data_error() {
    let path = rating_file(
        "missing-column",
        "user_id,item_id,rating\n\
         u1,i1,5\n",
    );

    let result = DatasetReader::new()
        .file(&path)
        .rating_key("score")
        .read();
    assert!(matches!(result, Err(Error::Data(_))));
}


#[test]
fn a_missing_file_setting_is_a_configuration_error() {
    let result = DatasetReader::<PathBuf>::new().read();
    assert!(matches!(result, Err(Error::Configuration(_))));
}
