//! Reading a file with typed columns, validation and per-row error reports.
//!
//! Run with: cargo run --example read_typed

use serde::Deserialize;
use serde_dsv::convert::{Codec, DateCodec, IntegerCodec, Length, OneOf, Params, Registry, TextCodec};
use serde_dsv::{CsvOptions, CsvReader, Direction, FieldProcessor, Schema, SerdeBinder, ValueType};
use std::error::Error;

const INPUT: &str = "\
id,name,department,hired,salary
1,Ada Lovelace,engineering,1843-07-01,5400
2,,engineering,1850-01-01,4000
3,Charles Babbage,finance,1822-06-14,-10
4,Grace Hopper,engineering,1944-13-01,6100
five,Alan Turing,research,1936-05-28,5900
6,Mary Somerville,research,1826-02-20,4800
";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Employee {
    id: i64,
    name: String,
    department: String,
    hired: chrono::NaiveDate,
    salary: i64,
}

fn schema(registry: &Registry) -> Result<Schema, Box<dyn Error>> {
    let mut salary_bounds = Params::new();
    salary_bounds.insert("min".to_string(), "0".to_string());

    let schema = Schema::new()
        .field(
            "id",
            ValueType::Integer,
            FieldProcessor::new(IntegerCodec.directed(Direction::Parse)),
        )?
        .field(
            "name",
            ValueType::String,
            FieldProcessor::new(TextCodec { trim: true }.directed(Direction::Parse))
                .with_postcondition(Length::new(Some(2), Some(40))),
        )?
        .field(
            "department",
            ValueType::String,
            FieldProcessor::new(TextCodec::default().directed(Direction::Parse))
                .with_precondition(OneOf::new(["engineering", "finance", "research"])),
        )?
        .field(
            "hired",
            ValueType::Date,
            FieldProcessor::new(DateCodec::default().directed(Direction::Parse)),
        )?
        .field(
            "salary",
            ValueType::Integer,
            FieldProcessor::from_boxed(registry.converter(
                "integer",
                Direction::Parse,
                &Default::default(),
            )?)
            .with_boxed_postcondition(registry.validator("range", &salary_bounds)?),
        )?;
    Ok(schema)
}

fn main() -> Result<(), Box<dyn Error>> {
    let registry = Registry::with_defaults();
    let mut reader = CsvReader::from_str(
        INPUT,
        &CsvOptions::new(),
        schema(&registry)?,
        SerdeBinder::<Employee>::new(),
    )?;

    let mut accepted = Vec::new();
    for outcome in reader.records() {
        match outcome?.into_result() {
            Ok(employee) => {
                println!("ok      {:?}", employee);
                accepted.push(employee);
            }
            Err(err) => println!("skipped {}", err),
        }
    }

    println!("\n{} of 6 rows accepted", accepted.len());
    Ok(())
}
