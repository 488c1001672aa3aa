//! End-to-end tests of the printer facade over the in-memory transport.
//!
//! Each test drives `Printer` exactly as an application would and checks the
//! bytes that reached the transport.

use pretty_assertions::assert_eq;

use sunmi_printer::printer::TextEncoding;
use sunmi_printer::protocol::barcode::qr;
use sunmi_printer::protocol::{raw, text};
use sunmi_printer::render::bitmap;
use sunmi_printer::{
    Alignment, BarcodeOptions, CutMode, EscPosDriver, MemoryTransport, Printer, PrinterConfig,
    PrinterError, QrErrorLevel, Symbology, TextPosition,
};

type TestPrinter = Printer<EscPosDriver<MemoryTransport>>;

fn utf8_printer() -> (TestPrinter, MemoryTransport) {
    let sink = MemoryTransport::new();
    let config = PrinterConfig {
        encoding: TextEncoding::Utf8,
        ..PrinterConfig::sunmi_v2()
    };
    (Printer::escpos(sink.clone(), config), sink)
}

// ============================================================================
// COLUMNS
// ============================================================================

#[tokio::test]
async fn columns_wrap_overflowing_text_onto_new_lines() {
    let (printer, sink) = utf8_printer();
    printer
        .print_columns_text(
            &["Chocolate croissant", "2", "3.50"],
            &[10, 4, 6],
            &[Alignment::Left, Alignment::Right, Alignment::Right],
        )
        .await
        .unwrap();

    let printed = String::from_utf8(sink.written()).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines, vec!["Chocolate    2  3.50", "croissant"]);
}

#[tokio::test]
async fn columns_continuation_restarts_at_column_start() {
    let (printer, sink) = utf8_printer();
    printer
        .print_columns_text(
            &["Qty", "Extra long modifier"],
            &[4, 8],
            &[Alignment::Left, Alignment::Right, Alignment::Left],
        )
        .await
        .unwrap();

    let printed = String::from_utf8(sink.written()).unwrap();
    assert_eq!(printed, "Qty Extra lo\n    ng modif\n    ier\n");
}

#[tokio::test]
async fn columns_reject_mismatched_inputs() {
    let (printer, sink) = utf8_printer();
    let aligns = [Alignment::Left; 3];

    let result = printer.print_columns_text(&["a", "b"], &[4], &aligns).await;
    assert!(matches!(result, Err(PrinterError::InvalidArgument(_))));

    let result = printer
        .print_columns_text(&["a", "b", "c", "d"], &[2, 2, 2, 2], &aligns)
        .await;
    assert!(matches!(result, Err(PrinterError::InvalidArgument(_))));

    assert!(sink.written().is_empty());
}

#[tokio::test]
async fn columns_must_fit_the_paper_line() {
    let (printer, sink) = utf8_printer();
    let aligns = [Alignment::Left; 3];

    let result = printer
        .print_columns_text(&["Item", "Qty", "Price"], &[20, 20, 20], &aligns)
        .await;
    assert!(matches!(result, Err(PrinterError::InvalidArgument(_))));
    assert!(sink.written().is_empty());

    // 32 cells is exactly one Sunmi V2 line
    printer
        .print_columns_text(&["Item", "Qty", "Price"], &[20, 4, 8], &aligns)
        .await
        .unwrap();
    assert_eq!(String::from_utf8(sink.take_written()).unwrap(), "Item                Qty Price\n");

    let wide = Printer::escpos(
        MemoryTransport::new(),
        PrinterConfig {
            encoding: TextEncoding::Utf8,
            ..PrinterConfig::sunmi_80mm()
        },
    );
    wide.print_columns_text(&["Item", "Qty", "Price"], &[20, 20, 8], &aligns)
        .await
        .unwrap();
}

// ============================================================================
// RAW BYTES
// ============================================================================

#[tokio::test]
async fn raw_bytes_reach_the_transport_unchanged() {
    let (printer, sink) = utf8_printer();
    let bytes: Vec<u8> = vec![0x1B, 0x45, 0x01, 0x00, 0x7F, 0x80, 0xFF, 0x0A];

    printer
        .send_raw_bytes(&raw::encode_hex_tokens(&bytes))
        .await
        .unwrap();
    assert_eq!(sink.take_written(), bytes);

    printer.send_raw_bytes("1b 2d 01").await.unwrap();
    assert_eq!(sink.take_written(), text::underline_on());
}

#[tokio::test]
async fn malformed_raw_payload_sends_nothing() {
    let (printer, sink) = utf8_printer();
    for bad in ["", "0x1B, 0xZZ", "0x1B,,0x45", "123"] {
        let result = printer.send_raw_bytes(bad).await;
        assert!(
            matches!(result, Err(PrinterError::MalformedPayload(_))),
            "{:?} should be rejected",
            bad
        );
    }
    assert!(sink.written().is_empty());
}

// ============================================================================
// BUFFER MODE
// ============================================================================

#[tokio::test]
async fn clean_enter_then_exit_without_commit_prints_nothing() {
    let (printer, sink) = utf8_printer();
    printer.enter_printer_buffer(true).await.unwrap();
    printer.print_string("never printed\n").await.unwrap();
    printer.feed_lines(2).await.unwrap();

    assert!(printer.exit_printer_buffer(false).await.unwrap());
    assert!(sink.written().is_empty());
    assert_eq!(printer.printed_length().await.unwrap(), "0");
}

#[tokio::test]
async fn enter_without_clean_keeps_prior_content() {
    let (printer, sink) = utf8_printer();
    printer.enter_printer_buffer(true).await.unwrap();
    printer.print_string("first ").await.unwrap();

    printer.enter_printer_buffer(false).await.unwrap();
    printer.print_string("second").await.unwrap();
    assert!(sink.written().is_empty());

    assert!(printer.exit_printer_buffer(true).await.unwrap());
    assert_eq!(sink.written(), b"first second".to_vec());
}

#[tokio::test]
async fn clean_enter_discards_prior_content() {
    let (printer, sink) = utf8_printer();
    printer.enter_printer_buffer(true).await.unwrap();
    printer.print_string("stale").await.unwrap();

    printer.enter_printer_buffer(true).await.unwrap();
    printer.print_string("fresh").await.unwrap();
    assert!(printer.exit_printer_buffer(true).await.unwrap());
    assert_eq!(sink.written(), b"fresh".to_vec());
}

#[tokio::test]
async fn exit_reports_failed_flush() {
    let (printer, sink) = utf8_printer();
    printer.enter_printer_buffer(true).await.unwrap();
    printer.print_string("receipt").await.unwrap();

    sink.set_fail_writes(true);
    assert!(!printer.exit_printer_buffer(true).await.unwrap());

    sink.set_fail_writes(false);
    printer.enter_printer_buffer(false).await.unwrap();
    assert!(printer.exit_printer_buffer(true).await.unwrap());
    assert_eq!(sink.written(), b"receipt".to_vec());
}

#[tokio::test]
async fn commit_and_clear_return_status() {
    let (printer, sink) = utf8_printer();
    printer.enter_printer_buffer(true).await.unwrap();
    printer.print_string("ab").await.unwrap();
    assert_eq!(printer.commit_printer_buffer().await.unwrap(), "committed 2 bytes");
    assert_eq!(sink.take_written(), b"ab".to_vec());

    printer.print_string("cde").await.unwrap();
    assert_eq!(printer.clear_buffer().await.unwrap(), "cleared 3 bytes");
    assert!(printer.exit_printer_buffer(true).await.unwrap());
    assert!(sink.written().is_empty());
}

// ============================================================================
// QR CODES
// ============================================================================

#[tokio::test]
async fn higher_qr_level_has_more_redundancy_and_no_smaller_footprint() {
    let data = b"https://sunmi.com/order/000123";
    for size in [1u8, 4, 8] {
        let low = qr::footprint_dots(data, size, QrErrorLevel::L).unwrap();
        let high = qr::footprint_dots(data, size, QrErrorLevel::H).unwrap();
        assert!(high >= low, "size {}: H {} < L {}", size, high, low);
    }
    assert!(QrErrorLevel::H.recovery_percent() > QrErrorLevel::L.recovery_percent());
    assert!(QrErrorLevel::H > QrErrorLevel::L);

    let (printer, sink) = utf8_printer();
    printer
        .print_qr_code("https://sunmi.com/order/000123", 4, QrErrorLevel::L)
        .await
        .unwrap();
    let low_cmd = sink.take_written();
    printer
        .print_qr_code("https://sunmi.com/order/000123", 4, QrErrorLevel::H)
        .await
        .unwrap();
    let high_cmd = sink.take_written();

    assert_eq!(low_cmd, qr::generate(data, 4, QrErrorLevel::L));
    assert_eq!(high_cmd, qr::generate(data, 4, QrErrorLevel::H));
    assert_eq!(low_cmd.len(), high_cmd.len());
}

#[tokio::test]
async fn qr_rejects_bad_module_size() {
    let (printer, sink) = utf8_printer();
    for size in [0u8, 17] {
        let result = printer.print_qr_code("x", size, QrErrorLevel::M).await;
        assert!(matches!(result, Err(PrinterError::InvalidArgument(_))));
    }
    assert!(sink.written().is_empty());
}

// ============================================================================
// TEXT AND ALIGNMENT
// ============================================================================

#[tokio::test]
async fn alignment_applies_to_the_next_print() {
    let (printer, sink) = utf8_printer();
    printer.set_alignment(Alignment::Center).await.unwrap();
    printer.print_string("Total\n").await.unwrap();
    printer.set_alignment(Alignment::Right).await.unwrap();
    printer.print_original_text("9.99\n").await.unwrap();

    let mut expected = vec![0x1B, 0x61, 0x01];
    expected.extend(b"Total\n");
    expected.extend([0x1B, 0x61, 0x02]);
    expected.extend(b"9.99\n");
    assert_eq!(sink.written(), expected);
}

#[tokio::test]
async fn font_selection_and_one_off_font() {
    let (printer, sink) = utf8_printer();
    printer.set_font_name("gh").await.unwrap();
    printer.set_font_size(24.0).await.unwrap();
    assert_eq!(sink.take_written(), vec![0x1B, 0x4D, 0x00, 0x1D, 0x21, 0x00]);

    printer.print_text_with_font("BIG", "gh", 72.0).await.unwrap();
    let written = sink.take_written();
    assert_eq!(&written[..6], &[0x1B, 0x4D, 0x00, 0x1D, 0x21, 0x22]);
    assert_eq!(&written[6..9], b"BIG");
    assert_eq!(&written[9..], &[0x1B, 0x4D, 0x00, 0x1D, 0x21, 0x00]);

    assert!(matches!(
        printer.set_font_name("serif").await,
        Err(PrinterError::UnsupportedFont(_))
    ));
    assert!(matches!(
        printer.set_font_size(-1.0).await,
        Err(PrinterError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn gbk_printer_encodes_chinese_text() {
    let sink = MemoryTransport::new();
    let printer = Printer::escpos(sink.clone(), PrinterConfig::sunmi_v2());
    printer.initialize().await.unwrap();
    printer.print_string("中文\n").await.unwrap();

    assert_eq!(
        sink.written(),
        vec![0x1B, 0x40, 0x1C, 0x26, 0xD6, 0xD0, 0xCE, 0xC4, 0x0A]
    );
}

// ============================================================================
// DEVICE AND STATUS
// ============================================================================

#[tokio::test]
async fn initialize_without_printer_is_unavailable() {
    let printer = Printer::escpos(MemoryTransport::offline(), PrinterConfig::sunmi_v2());
    assert!(matches!(
        printer.initialize().await,
        Err(PrinterError::DriverUnavailable(_))
    ));
    assert!(!printer.has_printer().await.unwrap());
}

#[tokio::test]
async fn identification_queries() {
    let (printer, sink) = utf8_printer();
    sink.push_response(b"_V2_PRO\0".to_vec());
    sink.push_response(b"_1.0.18\0".to_vec());
    sink.push_response(b"_N4110A\0".to_vec());

    assert_eq!(printer.model().await.unwrap(), "V2_PRO");
    assert_eq!(printer.version().await.unwrap(), "1.0.18");
    assert_eq!(printer.serial_number().await.unwrap(), "N4110A");
    assert_eq!(
        sink.written(),
        vec![0x1D, 0x49, 67, 0x1D, 0x49, 65, 0x1D, 0x49, 68]
    );

    assert!(matches!(
        printer.serial_number().await,
        Err(PrinterError::Driver(_))
    ));
}

#[tokio::test]
async fn self_test_report_and_fault() {
    let (printer, sink) = utf8_printer();
    sink.push_response(vec![0x12]);
    sink.push_response(vec![0x12]);
    assert!(printer.self_test().await.unwrap().is_some());

    sink.push_response(vec![0x16]);
    sink.push_response(vec![0x12]);
    match printer.self_test().await {
        Err(PrinterError::HardwareFault(msg)) => assert!(msg.contains("cover open")),
        other => panic!("expected hardware fault, got {:?}", other),
    }
}

#[tokio::test]
async fn printed_length_tracks_print_output() {
    let (printer, _sink) = utf8_printer();
    printer.initialize().await.unwrap();
    assert_eq!(printer.printed_length().await.unwrap(), "0");

    printer.print_string("1234567890").await.unwrap();
    printer.cut_paper(CutMode::Partial).await.unwrap();
    assert_eq!(printer.printed_length().await.unwrap(), "13");
}

#[tokio::test]
async fn feed_and_cut() {
    let (printer, sink) = utf8_printer();
    printer.feed_lines(0).await.unwrap();
    printer.feed_lines(300).await.unwrap();
    printer.cut_paper(CutMode::Partial).await.unwrap();

    assert_eq!(
        sink.written(),
        vec![0x1B, 0x64, 255, 0x1B, 0x64, 45, 0x1D, 0x56, 0x01]
    );
}

// ============================================================================
// BARCODES AND BITMAPS
// ============================================================================

#[tokio::test]
async fn barcode_with_options() {
    let (printer, sink) = utf8_printer();
    let options = BarcodeOptions::default()
        .height(80)
        .width(3)
        .text_position(TextPosition::Both);
    printer
        .print_barcode("4006381333931", Symbology::Ean13, options)
        .await
        .unwrap();

    let mut expected = vec![0x1D, 0x48, 3, 0x1D, 0x68, 80, 0x1D, 0x77, 3, 0x1D, 0x6B, 67, 13];
    expected.extend(b"4006381333931");
    assert_eq!(sink.written(), expected);

    let result = printer
        .print_barcode("ABC", Symbology::UpcA, BarcodeOptions::default())
        .await;
    assert!(matches!(
        result,
        Err(PrinterError::InvalidPayloadForSymbology { .. })
    ));
}

#[tokio::test]
async fn bitmap_from_base64_png() {
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([0])))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    let encoded = format!("data:image/png;base64,{}", bitmap::encode_base64(&png));

    let (printer, sink) = utf8_printer();
    printer.print_bitmap(&encoded, 8, 2).await.unwrap();
    assert_eq!(
        sink.written(),
        vec![0x1D, 0x76, 0x30, 0x00, 1, 0, 2, 0, 0xFF, 0xFF]
    );

    assert!(matches!(
        printer.print_bitmap("not base64!", 8, 2).await,
        Err(PrinterError::UnsupportedImageFormat(_))
    ));
    assert!(matches!(
        printer.print_bitmap(&encoded, 0, 2).await,
        Err(PrinterError::Dimension(_))
    ));
}
