use std::fmt::Write;

use quartz_nbt::NbtCompound;

use crate::document::{self, Document, POSITION, SIZE};
use crate::metadata::{Metadata, METADATA};

pub fn format_document(document: &Document) -> String {
    let mut output = String::new();

    writeln!(output, "Schematic:").unwrap();
    if let Ok(metadata) = document.root().get::<_, &NbtCompound>(METADATA) {
        format_metadata(&mut output, &Metadata::from_nbt(metadata));
    }

    writeln!(output, "Regions:").unwrap();
    match document.region_names() {
        Ok(names) => {
            for name in names {
                format_region(&mut output, document, &name);
            }
        }
        Err(e) => {
            writeln!(output, "  <{}>", e).unwrap();
        }
    }

    output
}

fn format_metadata(output: &mut String, metadata: &Metadata) {
    writeln!(output, "Metadata:").unwrap();
    if let Some(name) = &metadata.name {
        writeln!(output, "  Name: {}", name).unwrap();
    }
    if let Some(author) = &metadata.author {
        writeln!(output, "  Author: {}", author).unwrap();
    }
    if let Some(region_count) = metadata.region_count {
        writeln!(output, "  Regions: {}", region_count).unwrap();
    }
    if let Some(size) = metadata.enclosing_size {
        writeln!(output, "  Enclosing size: {:?}", size).unwrap();
    }
}

fn format_region(output: &mut String, document: &Document, name: &str) {
    writeln!(output, "  Region: {}", name).unwrap();
    let region = match document.region(name) {
        Ok(region) => region,
        Err(e) => {
            writeln!(output, "    <{}>", e).unwrap();
            return;
        }
    };
    for field in [POSITION, SIZE] {
        match document::read_block_position(region, name, field) {
            Ok(value) => writeln!(output, "    {}: {:?}", field, value.to_tuple()).unwrap(),
            Err(e) => writeln!(output, "    {}: <{}>", field, e).unwrap(),
        }
    }
}
