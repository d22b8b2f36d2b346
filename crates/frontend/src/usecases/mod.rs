pub mod u501_compress_file;
