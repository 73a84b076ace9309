/*!
# FitSheet

A small fitness log dashboard backed by a Google spreadsheet, built in Rust.

## Overview

Workouts and body measurements are entered through two forms and appended as
rows to two tabs of one spreadsheet document. The same page reads both tabs
back and shows them as history tables, body metric trend charts and a daily
training volume chart.

## Architecture

### Frontend Layer
- **Technologies**: HTML, CSS, inline SVG
- One server-rendered page with the two entry forms and three sections

### Backend Layer
- **Technologies**: Rust, axum, handlebars, plotters
- **Core Components**:
  - Sheet access - service-account auth and the values API behind [`sheets::SheetStore`]
  - Entry validation - typed workout and metric rows built from form input
  - Frames - date-parsed, sortable views over a tab's records
  - Volume - per-day sets x reps x weight totals
  - Sections - each section reads its data and reports its own failures

### Data Persistence Layer
- The spreadsheet itself; nothing is stored locally
- CSV and XLSX download of either tab

## Modules

- **app**: Routing, handlers and the memoized sheet client
- **config**: Command-line and environment settings
- **credentials**: Service-account key loading and assertion signing
- **google**: Google Sheets and Drive client
- **memory**: In-process sheet store
- **sheets**: Cell values, records and the store traits
- **entries**: Form input validation and row layout
- **frame**: Date parsing and numeric coercion over records
- **volume**: Daily workout volume
- **dashboard**: The three page sections
- **graph**: SVG line charts
- **downloader**: Export functionality (CSV, XLSX)
- **error**: Error types

## REST API Endpoints

- `GET /` - The dashboard
- `POST /workouts` - Logs one workout row
- `POST /metrics` - Logs one body metrics row
- `GET /export/{workouts|metrics}/{csv|xlsx}` - Downloads a tab
*/

pub mod app;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod downloader;
pub mod entries;
pub mod error;
pub mod frame;
pub mod google;
pub mod graph;
pub mod memory;
pub mod sheets;
pub mod volume;
