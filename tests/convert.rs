//! End-to-end conversion: raw sonic files on disk to a NetCDF file and back.

use std::fs;

use harmattan::amf::VariableTable;
use harmattan::gill;
use harmattan::series::SonicSeries;
use harmattan::writer::{self, DatasetAttrs};
use netcdf::types::{FloatType, NcVariableType};
use netcdf::AttributeValue;

/// One 77-byte logger line, exactly as the serial logger writes it.
fn logger_line(logged: &str, sampled: &str, u: f64, v: f64) -> String {
    format!("{logged},UTC,{sampled} \u{2}Q,{u:+07.2},{v:+07.2},M,00,\u{3}\n")
}

fn str_attr(value: AttributeValue) -> String {
    match value {
        AttributeValue::Str(text) => text,
        other => panic!("expected a string attribute, got {other:?}"),
    }
}

#[test]
fn logger_capture_to_netcdf() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("2D-sonic-000-2017242.00");

    let mut capture = String::new();
    capture.push_str(&logger_line(
        "2017-08-30 01:17:51",
        "2017-08-30T01:17:52.906838",
        2.0,
        0.0,
    ));
    capture.push_str(&logger_line(
        "2017-08-30 01:17:52",
        "2017-08-30T01:17:53.906838",
        0.0,
        -3.0,
    ));
    // Serial corruption: a truncated line and an out-of-status reading.
    capture.push_str("garbled\n");
    capture.push_str(
        &logger_line(
            "2017-08-30 01:17:53",
            "2017-08-30T01:17:54.906838",
            1.0,
            1.0,
        )
        .replace("M,00,", "M,01,"),
    );
    fs::write(&raw, capture).unwrap();

    let outcome = gill::scan_files(std::slice::from_ref(&raw)).unwrap();
    assert_eq!(outcome.stats.files, 1);
    assert_eq!(outcome.stats.accepted, 2);
    assert_eq!(outcome.stats.rejected_length, 1);
    assert_eq!(outcome.stats.rejected_status, 1);

    let series = SonicSeries::from_records(&outcome.records);
    let out = dir.path().join("sonic.nc");
    writer::write_netcdf(
        &series,
        &VariableTable::builtin(),
        &DatasetAttrs::default(),
        &out,
    )
    .unwrap();

    let file = netcdf::open(&out).unwrap();
    assert_eq!(file.dimension("time").unwrap().len(), 2);

    let time = file.variable("time").unwrap();
    assert_eq!(time.get_values::<f64, _>(..).unwrap(), vec![0.0, 1.0]);
    assert_eq!(
        str_attr(time.attribute("units").unwrap().value().unwrap()),
        "seconds since 2017-08-30 01:17:52"
    );

    // u_gill = +2 is a wind towards the west: eastward -2, blowing from 180.
    let speed = file.variable("wind_speed").unwrap();
    assert_eq!(speed.vartype(), NcVariableType::Float(FloatType::F32));
    let speeds = speed.get_values::<f64, _>(..).unwrap();
    assert!((speeds[0] - 2.0).abs() < 1e-6);
    assert!((speeds[1] - 3.0).abs() < 1e-6);

    let directions = file
        .variable("wind_from_direction")
        .unwrap()
        .get_values::<f64, _>(..)
        .unwrap();
    assert!((directions[0] - 180.0).abs() < 1e-6);
    assert!((directions[1] - 270.0).abs() < 1e-6);

    let east = file
        .variable("eastward_wind")
        .unwrap()
        .get_values::<f64, _>(..)
        .unwrap();
    assert!((east[0] + 2.0).abs() < 1e-6);
    assert!(east[1].abs() < 1e-6);

    let north = file
        .variable("northward_wind")
        .unwrap()
        .get_values::<f64, _>(..)
        .unwrap();
    assert!(north[0].abs() < 1e-6);
    assert!((north[1] + 3.0).abs() < 1e-6);

    assert_eq!(
        str_attr(file.attribute("Conventions").unwrap().value().unwrap()),
        "CF-1.6"
    );
    assert_eq!(
        str_attr(file.attribute("institution").unwrap().value().unwrap()),
        "NCAS"
    );
    let history = str_attr(file.attribute("history").unwrap().value().unwrap());
    assert!(history.contains("written by harmattan"));
}

#[test]
fn averaged_conversion_bins_on_whole_minutes() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("2D-sonic-000-2017242.00");

    let capture = [
        logger_line("2017-08-30 01:17:51", "2017-08-30T01:17:52.906838", 2.0, 0.0),
        logger_line("2017-08-30 01:17:52", "2017-08-30T01:17:53.906838", 4.0, 0.0),
        logger_line("2017-08-30 01:18:09", "2017-08-30T01:18:10.906838", 6.0, 0.0),
    ]
    .concat();
    fs::write(&raw, capture).unwrap();

    let outcome = gill::scan_files(std::slice::from_ref(&raw)).unwrap();
    let series = SonicSeries::from_records(&outcome.records).resample_mean(60);

    let out = dir.path().join("sonic-1min.nc");
    writer::write_netcdf(
        &series,
        &VariableTable::builtin(),
        &DatasetAttrs::default(),
        &out,
    )
    .unwrap();

    let file = netcdf::open(&out).unwrap();
    let time = file.variable("time").unwrap();
    // Bins align to whole minutes even though sampling started mid-minute.
    assert_eq!(
        str_attr(time.attribute("units").unwrap().value().unwrap()),
        "seconds since 2017-08-30 01:17:00"
    );
    assert_eq!(time.get_values::<f64, _>(..).unwrap(), vec![0.0, 60.0]);

    let east = file
        .variable("eastward_wind")
        .unwrap()
        .get_values::<f64, _>(..)
        .unwrap();
    assert!((east[0] + 3.0).abs() < 1e-6); // mean of -2 and -4
    assert!((east[1] + 6.0).abs() < 1e-6);
}

#[test]
fn custom_variable_table_controls_names_and_types() {
    let table_csv = "\
Variable,Attribute,Value
wind_speed,,
,name,ws
,type,float64
,dimension,time
,long_name,Mean Wind Speed
,units,m s-1
,standard_name,wind_speed
wind_from_direction,,
,name,wd
,type,float32
,dimension,time
,long_name,Wind From Direction
,units,degree
,standard_name,wind_from_direction
eastward_wind,,
,name,u
,type,float32
,dimension,time
,long_name,Eastward Wind Component in Earth Coordinates
,units,m s-1
,standard_name,eastward_wind
northward_wind,,
,name,v
,type,float32
,dimension,time
,long_name,Northward Wind Component in Earth Coordinates
,units,m s-1
,standard_name,northward_wind
";
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("variables.csv");
    fs::write(&csv_path, table_csv).unwrap();
    let table = VariableTable::from_csv(&csv_path).unwrap();

    let raw = dir.path().join("2D-sonic-000-2017242.00");
    fs::write(
        &raw,
        logger_line("2017-08-30 01:17:51", "2017-08-30T01:17:52.906838", 2.0, 0.5),
    )
    .unwrap();
    let outcome = gill::scan_files(std::slice::from_ref(&raw)).unwrap();
    let series = SonicSeries::from_records(&outcome.records);

    let out = dir.path().join("renamed.nc");
    writer::write_netcdf(&series, &table, &DatasetAttrs::default(), &out).unwrap();

    let file = netcdf::open(&out).unwrap();
    let ws = file.variable("ws").unwrap();
    assert_eq!(ws.vartype(), NcVariableType::Float(FloatType::F64));
    assert!(file.variable("wd").is_some());
    assert!(file.variable("u").is_some());
    assert!(file.variable("v").is_some());
    assert!(file.variable("wind_speed").is_none());
}
