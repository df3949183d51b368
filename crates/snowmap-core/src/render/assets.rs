// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Static page pieces. Dynamic values reach the script through the
//! `SNOWMAP_CONFIG` object written by the renderer.

pub const HEAD_LINKS: &str = r#"    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
    <link rel="stylesheet" href="https://unpkg.com/leaflet-minimap@3.6.1/dist/Control.MiniMap.min.css"/>
    <link rel="stylesheet" href="https://unpkg.com/leaflet-control-geocoder@2.4.0/dist/Control.Geocoder.css"/>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://unpkg.com/leaflet-minimap@3.6.1/dist/Control.MiniMap.min.js"></script>
    <script src="https://unpkg.com/leaflet-control-geocoder@2.4.0/dist/Control.Geocoder.js"></script>
"#;

pub const PAGE_CSS: &str = r#"    <style>
        html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
        #map { position: absolute; top: 0; bottom: 0; right: 0; left: 0; }

        .map-title {
            position: fixed; top: 10px; right: 10px; width: 280px; height: auto;
            z-index: 9999; font-size: 16px; background-color: rgba(255, 255, 255, 0.8);
            border: 2px solid grey; border-radius: 5px; padding: 10px;
            text-align: center; font-weight: bold; font-family: sans-serif;
        }
        .map-title span { font-size: 14px; font-weight: normal; }

        /* Keep the top-right controls clear of the title */
        .leaflet-top.leaflet-right { margin-top: 80px !important; }
        .leaflet-control svg .tick text { font-size: 14px !important; font-weight: 500; }
        .leaflet-control svg .caption { font-size: 16px !important; font-weight: bold; }

        .colorbar-container {
            position: fixed; top: 100px; left: 10px; z-index: 1000;
            background: rgba(255, 255, 255, 0.8); padding: 5px; border-radius: 5px;
            font-family: sans-serif;
        }
        .colorbar-container svg { font-size: 16px !important; }
        .colorbar-container svg .caption { font-size: 18px !important; font-weight: bold !important; }
        .colorbar-container svg .tick text { font-size: 14px !important; }

        .leaflet-control-geocoder {
            position: fixed !important; top: 10px !important; left: 55px !important; margin: 0 !important;
        }
        .leaflet-control-geocoder.leaflet-control-geocoder-expanded { width: 300px !important; }

        .wind-icon { background: none; border: none; }
    </style>
"#;

pub const MAP_SCRIPT: &str = r#"
(function () {
    var cfg = SNOWMAP_CONFIG;

    var baseLayers = {};
    cfg.base_layers.forEach(function (b, i) {
        baseLayers[b.name] = L.tileLayer(b.url, { attribution: b.attribution, maxZoom: b.max_zoom });
    });

    var map = L.map('map', {
        center: cfg.center,
        zoom: cfg.zoom,
        layers: [baseLayers[cfg.base_layers[0].name]]
    });
    window.snowmap = map;

    var first = cfg.base_layers[0];
    new L.Control.MiniMap(
        L.tileLayer(first.url, { attribution: first.attribution }),
        { toggleDisplay: true }
    ).addTo(map);

    var overlays = {};
    var groups = {};
    cfg.layers.forEach(function (layer) {
        groups[layer.key] = L.featureGroup();
        overlays[layer.name] = groups[layer.key];
    });

    cfg.stations.forEach(function (s) {
        var loc = [s.lat, s.lon];
        ['hs', 'hn24', 'hn72'].forEach(function (key) {
            var c = s[key];
            L.circle(loc, {
                radius: c.radius,
                color: s.color,
                weight: 3,
                fill: true,
                fillColor: c.fill_color,
                fillOpacity: 0.7
            })
                .bindPopup(s.popup, { maxWidth: 300 })
                .bindTooltip(c.tooltip)
                .addTo(groups[key]);
        });

        L.marker(loc, {
            icon: L.divIcon({ html: s.wind.icon_html, className: 'wind-icon', iconSize: [30, 30] })
        })
            .bindTooltip(s.wind.tooltip)
            .addTo(groups.wind);
    });

    cfg.layers.forEach(function (layer) {
        if (layer.show) {
            groups[layer.key].addTo(map);
        }
    });

    L.Control.geocoder({
        geocoder: L.Control.Geocoder.photon(),
        position: 'topleft'
    }).addTo(map);

    L.control.layers(baseLayers, overlays, { position: 'bottomright', collapsed: false }).addTo(map);

    // Circle border thickness follows the zoom level
    function updateStrokeWeight() {
        var weight = Math.max(1, map.getZoom() / 3);
        map.eachLayer(function (layer) {
            if (layer instanceof L.Circle) {
                layer.setStyle({ weight: weight });
            }
        });
    }
    map.on('zoomend', updateStrokeWeight);
    updateStrokeWeight();

    // Show the legend of the most recently enabled snow layer
    var layerColorbar = {};
    var activeLayers = new Set();
    cfg.layers.forEach(function (layer) {
        if (layer.colorbar_id) {
            layerColorbar[layer.name] = layer.colorbar_id;
            if (layer.show) {
                activeLayers.add(layer.name);
            }
        }
    });

    function updateColorbar() {
        document.querySelectorAll('.colorbar-container').forEach(function (el) {
            el.style.display = 'none';
        });
        var active = Array.from(activeLayers);
        if (active.length > 0) {
            var el = document.getElementById(layerColorbar[active[active.length - 1]]);
            if (el) {
                el.style.display = 'block';
            }
        }
    }

    map.on('overlayadd', function (e) {
        if (layerColorbar[e.name]) {
            activeLayers.add(e.name);
            updateColorbar();
        }
    });
    map.on('overlayremove', function (e) {
        if (layerColorbar[e.name]) {
            activeLayers.delete(e.name);
            updateColorbar();
        }
    });
    updateColorbar();
})();
"#;
