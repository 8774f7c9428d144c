//! Converter fixture self-test: prints each fixture's conversion result so a
//! deployed binary can be sanity-checked without feeding it input.

use std::fmt::Display;

use anyhow::Result;

use crate::convert::{self, ConvertOptions, DEFAULT_DATE_FORMAT};

fn show<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

pub fn run() -> Result<()> {
    let defaults = ConvertOptions::default();
    let no_trim = ConvertOptions {
        trim: false,
        replace_double_spaces: false,
        ..ConvertOptions::default()
    };
    let upper = ConvertOptions {
        upper_case: true,
        ..ConvertOptions::default()
    };

    println!("normalize_string:");
    println!(
        "normalize_string(\" foo bar \") = \"{}\"",
        show(convert::normalize_string(Some(" foo bar "), &defaults))
    );
    println!(
        "normalize_string(\" foo bar \", trim: false) = \"{}\"",
        show(convert::normalize_string(Some(" foo bar "), &no_trim))
    );
    println!(
        "normalize_string(\"\\\" foo bar \\\"\") = \"{}\"",
        show(convert::normalize_string(Some("\" foo bar \""), &defaults))
    );
    println!(
        "normalize_string(\" foo\\nbar \") = \"{}\"",
        show(convert::normalize_string(Some(" foo\nbar "), &defaults))
    );
    println!(
        "normalize_string(\" foo  bar \") = \"{}\"",
        show(convert::normalize_string(Some(" foo  bar "), &defaults))
    );
    println!(
        "normalize_string(\" foo  bar \", upper_case: true) = \"{}\"",
        show(convert::normalize_string(Some(" foo  bar "), &upper))
    );

    println!();
    println!("to_big_int:");
    for token in [
        "1234567",
        "-1234567",
        "1234567-",
        "(1234567)",
        "1 234 567",
        "1,234,567",
        "",
    ] {
        println!(
            "to_big_int(\"{token}\") = {}",
            show(convert::to_big_int(Some(token), false)?)
        );
    }
    println!(
        "to_big_int(\"\", zero_for_null: true) = {}",
        show(convert::to_big_int(Some(""), true)?)
    );

    println!();
    println!("to_double:");
    for token in [
        "12345.67",
        "12345,67",
        "12 345.67",
        "12,345.67",
        "12.345,67",
        "-12345.67",
        "12345.67-",
        "(12 345,67)",
        "-",
        "6.626e-34",
        "",
    ] {
        println!(
            "to_double(\"{token}\") = {}",
            show(convert::to_double(Some(token), false)?)
        );
    }
    println!(
        "to_double(\"\", zero_for_null: true) = {}",
        show(convert::to_double(Some(""), true)?)
    );

    println!();
    println!("to_boolean:");
    for token in ["true", "0", "-1"] {
        println!(
            "to_boolean(\"{token}\") = {}",
            show(convert::to_boolean(Some(token))?)
        );
    }

    println!();
    println!("to_date:");
    println!(
        "to_date(\"2020-12-31\") = {}",
        show(convert::to_date(Some("2020-12-31"), DEFAULT_DATE_FORMAT)?)
    );
    println!(
        "to_date(\"31122020\", \"%d%m%Y\") = {}",
        show(convert::to_date(Some("31122020"), "%d%m%Y")?)
    );

    println!();
    println!("to_interval:");
    for token in ["1:30", "0:05:30", "-2:15"] {
        println!(
            "to_interval(\"{token}\") = {}",
            show(convert::to_interval(Some(token))?.map(|td| crate::data::Value::Interval(td)))
        );
    }

    Ok(())
}
